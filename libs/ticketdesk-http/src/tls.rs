//! Root certificates and rustls configuration for HTTPS connections.

use crate::error::HttpError;
use rustls_pki_types::CertificateDer;
use std::sync::{Arc, OnceLock};

/// OS root certificates, loaded on first use. An empty list is cached too;
/// the failure is reported when a client is built, not on every lookup.
static NATIVE_ROOTS: OnceLock<Vec<CertificateDer<'static>>> = OnceLock::new();

fn load_native_roots() -> Vec<CertificateDer<'static>> {
    let result = rustls_native_certs::load_native_certs();
    for err in &result.errors {
        tracing::warn!(error = %err, "error loading native root certificate");
    }
    tracing::debug!(count = result.certs.len(), "loaded native root certificates");
    result.certs
}

fn native_roots() -> &'static [CertificateDer<'static>] {
    NATIVE_ROOTS.get_or_init(load_native_roots).as_slice()
}

/// Use the process-wide crypto provider if one is installed, aws-lc-rs otherwise.
pub(crate) fn crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

/// Build a rustls client configuration trusting the OS root store.
///
/// # Errors
/// Returns `HttpError::Tls` when the OS store yields no usable root certificate.
pub(crate) fn native_roots_client_config() -> Result<rustls::ClientConfig, HttpError> {
    let certs = native_roots();
    if certs.is_empty() {
        return Err(HttpError::Tls(
            "no native root CA certificates found in OS certificate store".into(),
        ));
    }

    let mut roots = rustls::RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(certs.iter().cloned());
    if ignored > 0 {
        tracing::warn!(added, ignored, "some native root certificates could not be parsed");
    }
    if added == 0 {
        return Err(HttpError::Tls(
            format!("none of the {} native root certificates could be parsed", certs.len()).into(),
        ));
    }

    let config = rustls::ClientConfig::builder_with_provider(crypto_provider())
        .with_safe_default_protocol_versions()
        .map_err(|e| HttpError::Tls(Box::new(e)))?
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(config)
}
