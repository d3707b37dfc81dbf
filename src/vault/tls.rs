//! TLS client configuration for a custom Vault CA.
//!
//! The certificates from the CA file and CA directory become the only
//! trusted roots. With host verification off the chain is still checked
//! against those roots; only a name mismatch is forgiven.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::{ring, CryptoProvider};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};

use crate::config::ConnectionConfig;

/// Build a rustls client config for a connection with a custom CA.
///
/// Returns a plain error string; callers wrap it into the auth or fetch
/// error of the request being made.
pub fn client_config(config: &ConnectionConfig) -> Result<ClientConfig, String> {
    let roots = load_roots(config)?;
    let provider = Arc::new(ring::default_provider());

    let builder = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(|e| format!("TLS setup failed: {e}"))?;

    if config.verify_host {
        return Ok(builder.with_root_certificates(roots).with_no_client_auth());
    }

    tracing::warn!(
        address = %config.address,
        "host verification disabled: Vault certificate name will not be checked"
    );
    let verifier = SkipHostnameVerifier::new(roots, provider)?;
    Ok(builder
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth())
}

/// Collect PEM certificates from the CA file and every readable file in the CA dir.
fn load_roots(config: &ConnectionConfig) -> Result<RootCertStore, String> {
    let mut certs = Vec::new();

    if let Some(file) = &config.ca_file {
        certs.extend(read_pem_certs(file)?);
    }

    if let Some(dir) = &config.ca_path {
        let entries = fs::read_dir(dir)
            .map_err(|e| format!("cannot read CA directory {}: {e}", dir.display()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match read_pem_certs(&path) {
                Ok(found) => certs.extend(found),
                Err(e) => tracing::debug!(path = %path.display(), "skipping CA entry: {e}"),
            }
        }
    }

    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(certs);
    if ignored > 0 {
        tracing::debug!(ignored, "skipped unusable CA certificates");
    }
    if added == 0 {
        return Err("no CA certificates found in the configured CA file or directory".into());
    }
    Ok(roots)
}

fn read_pem_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, String> {
    let pem = fs::read(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;

    CertificateDer::pem_slice_iter(&pem)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid PEM in {}: {e}", path.display()))
}

/// Full WebPKI verification against the custom roots, except that a
/// certificate issued for another name is accepted.
#[derive(Debug)]
struct SkipHostnameVerifier {
    inner: Arc<WebPkiServerVerifier>,
}

impl SkipHostnameVerifier {
    fn new(roots: RootCertStore, provider: Arc<CryptoProvider>) -> Result<Self, String> {
        let inner = WebPkiServerVerifier::builder_with_provider(Arc::new(roots), provider)
            .build()
            .map_err(|e| format!("TLS setup failed: {e}"))?;
        Ok(Self { inner })
    }
}

impl ServerCertVerifier for SkipHostnameVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        // The chain is validated before the name, so a name error means the chain passed.
        match self
            .inner
            .verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)
        {
            Err(rustls::Error::InvalidCertificate(
                CertificateError::NotValidForName | CertificateError::NotValidForNameContext { .. },
            )) => Ok(ServerCertVerified::assertion()),
            other => other,
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn config() -> ConnectionConfig {
        ConnectionConfig {
            address: "https://vault".to_string(),
            ca_file: None,
            ca_path: None,
            verify_host: true,
        }
    }

    fn ca_pem() -> String {
        let key = rcgen::KeyPair::generate().unwrap();
        let mut params = rcgen::CertificateParams::new(Vec::<String>::new()).unwrap();
        params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
        params.self_signed(&key).unwrap().pem()
    }

    #[test]
    fn missing_ca_file_fails() {
        let cfg = ConnectionConfig {
            ca_file: Some(PathBuf::from("/nonexistent/ca.pem")),
            ..config()
        };
        let err = client_config(&cfg).unwrap_err();
        assert!(err.contains("/nonexistent/ca.pem"));
    }

    #[test]
    fn ca_dir_without_certificates_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README"), "not a certificate").unwrap();
        let cfg = ConnectionConfig {
            ca_path: Some(dir.path().to_path_buf()),
            ..config()
        };
        let err = client_config(&cfg).unwrap_err();
        assert!(err.contains("no CA certificates"));
    }

    #[test]
    fn ca_file_and_dir_are_combined() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("ca.pem");
        fs::write(&file, ca_pem()).unwrap();
        let certs = dir.path().join("certs");
        fs::create_dir(&certs).unwrap();
        fs::write(certs.join("a.pem"), ca_pem()).unwrap();
        fs::write(certs.join("notes.txt"), "ignored").unwrap();

        let cfg = ConnectionConfig {
            ca_file: Some(file),
            ca_path: Some(certs),
            ..config()
        };
        assert_eq!(load_roots(&cfg).unwrap().len(), 2);
    }

    #[test]
    fn relaxed_config_builds() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("ca.pem");
        fs::write(&file, ca_pem()).unwrap();

        let cfg = ConnectionConfig {
            ca_file: Some(file),
            verify_host: false,
            ..config()
        };
        assert!(client_config(&cfg).is_ok());
    }
}
