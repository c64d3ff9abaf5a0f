use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use booth_session_engine::config::BlobStorageConfig;
use booth_session_engine::storage::blob_sas::BlobSasProvisioner;
use booth_session_engine::storage::traits::UploadProvisioner;

fn config() -> BlobStorageConfig {
    BlobStorageConfig {
        account_name: "fakeaccount".into(),
        account_key: STANDARD.encode(b"fakekey"),
        container_name: "fakecontainer".into(),
        ..BlobStorageConfig::default()
    }
}

#[tokio::test]
async fn test_upload_urls_shape() {
    let provisioner = BlobSasProvisioner::new(&config()).unwrap();
    let urls = provisioner
        .upload_urls("test-session", "user123")
        .await
        .unwrap();

    assert_eq!(urls.len(), 4);
    for cut in 0..4 {
        let url = &urls[&cut.to_string()];
        assert!(url.starts_with(&format!(
            "https://fakeaccount.blob.core.windows.net/fakecontainer/sessions/test-session/cuts/user123_{}.webp?",
            cut
        )));
        assert!(url.contains("sv=2023-11-03"));
        assert!(url.contains("sr=b"));
        assert!(url.contains("sp=w"));
        assert!(url.contains("&sig="));
    }
}

#[tokio::test]
async fn test_each_cut_has_distinct_signature() {
    let provisioner = BlobSasProvisioner::new(&config()).unwrap();
    let urls = provisioner.upload_urls("s", "u").await.unwrap();

    let mut signatures: Vec<&str> = urls
        .values()
        .map(|url| url.split("&sig=").nth(1).unwrap())
        .collect();
    signatures.sort();
    signatures.dedup();
    assert_eq!(signatures.len(), 4);
}

#[tokio::test]
async fn test_expiry_is_fifteen_minutes_out() {
    let provisioner = BlobSasProvisioner::new(&config()).unwrap();
    let before = chrono::Utc::now();
    let urls = provisioner.upload_urls("s", "u").await.unwrap();

    let se = urls["0"]
        .split('&')
        .find_map(|pair| pair.strip_prefix("se="))
        .unwrap();
    let se = se.replace("%3A", ":");
    let expiry = chrono::DateTime::parse_from_rfc3339(&se).unwrap();
    let delta = expiry.with_timezone(&chrono::Utc) - before;
    assert!(delta.num_seconds() >= 14 * 60 && delta.num_seconds() <= 15 * 60);
}
