use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use log::debug;

/// Object-storage source holding the raw SINAN extracts.
///
/// Credentials and region resolve from the standard AWS environment
/// (env vars, profile, instance metadata); only the bucket name is
/// pipeline configuration.
pub struct BucketSource {
    client: Client,
    bucket: String,
}

/// Only delimited extracts are processed; everything else in the bucket
/// (manifests, dictionaries) is ignored.
pub fn is_extract_key(key: &str) -> bool {
    key.ends_with(".csv")
}

impl BucketSource {
    pub async fn connect(bucket: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self {
            client: Client::new(&config),
            bucket: bucket.to_string(),
        }
    }

    /// Lists every `.csv` object key in the bucket, in sorted order so
    /// runs process files deterministically.
    pub async fn list_extract_keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page
                .with_context(|| format!("falha ao listar objetos do bucket '{}'", self.bucket))?;
            for object in page.contents() {
                if let Some(key) = object.key() {
                    if is_extract_key(key) {
                        keys.push(key.to_string());
                    } else {
                        debug!("ignorando objeto '{key}'");
                    }
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    /// Downloads one object fully into memory.
    pub async fn download(&self, key: &str) -> Result<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("falha ao baixar '{key}'"))?;

        let bytes = output
            .body
            .collect()
            .await
            .with_context(|| format!("falha ao ler o corpo de '{key}'"))?;

        Ok(bytes.into_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_extract_key() {
        assert!(is_extract_key("DENGBR24.csv"));
        assert!(is_extract_key("2023/DENGBR23.csv"));

        assert!(!is_extract_key("DENGBR24.dbf"));
        assert!(!is_extract_key("dicionario.pdf"));
        assert!(!is_extract_key("manifest.json"));
        assert!(!is_extract_key("csv"));
    }
}
