use anyhow::Result;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::client::SecretsClient;

/// Every secret name the remote service knows about, as of one full listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretsIndex {
    names: HashSet<String>,
}

impl SecretsIndex {
    /// Pages through the whole remote listing. Always runs to the last page.
    #[tracing::instrument(skip(client))]
    pub async fn load<C: SecretsClient + ?Sized>(client: &C) -> Result<Self> {
        let mut names = HashSet::new();
        let mut token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = client.list_secrets(token.as_deref()).await?;
            pages += 1;
            debug!(page = pages, names = page.names.len(), "Secrets listing page received");
            names.extend(page.names);

            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        info!(pages, secrets = names.len(), "Secrets index loaded");
        Ok(Self { names })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in sorted order.
    pub fn sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl FromIterator<String> for SecretsIndex {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SecretsPage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves fixed pages and records the tokens it was asked for.
    struct Paged {
        pages: Vec<Vec<&'static str>>,
        seen_tokens: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl SecretsClient for Paged {
        async fn list_secrets(&self, page_token: Option<&str>) -> Result<SecretsPage> {
            self.seen_tokens
                .lock()
                .unwrap()
                .push(page_token.map(str::to_string));
            let idx: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
            let next_token = (idx + 1 < self.pages.len()).then(|| (idx + 1).to_string());
            Ok(SecretsPage {
                names: self.pages[idx].iter().map(|s| s.to_string()).collect(),
                next_token,
            })
        }

        async fn get_secret_value(&self, _secret_id: &str) -> Result<String> {
            unreachable!("index never fetches values")
        }
    }

    #[tokio::test]
    async fn test_load_follows_every_page() {
        let client = Paged {
            pages: vec![vec!["a/x", "a/y"], vec!["a/z"], vec![]],
            seen_tokens: Mutex::new(Vec::new()),
        };

        let index = SecretsIndex::load(&client).await.unwrap();

        assert_eq!(index.len(), 3);
        assert!(index.contains("a/z"));
        assert!(!index.contains("a/w"));
        assert_eq!(
            *client.seen_tokens.lock().unwrap(),
            vec![None, Some("1".to_string()), Some("2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_load_does_not_stop_early() {
        let client = Paged {
            pages: vec![vec!["target"], vec!["other"]],
            seen_tokens: Mutex::new(Vec::new()),
        };

        let index = SecretsIndex::load(&client).await.unwrap();

        assert_eq!(client.seen_tokens.lock().unwrap().len(), 2);
        assert_eq!(index.sorted(), vec!["other", "target"]);
    }

    #[test]
    fn test_from_iter() {
        let index: SecretsIndex = vec!["b".to_string(), "a".to_string()].into_iter().collect();
        assert_eq!(index.sorted(), vec!["a", "b"]);
        assert!(!index.is_empty());
    }
}
