//! Per-method call execution.

use super::resolver::{self, ResolvedRequest};
use crate::client::ApiClient;
use crate::constants;
use crate::error::Error;
use crate::invocation::{CallArg, CallOutput};
use crate::metadata::{ResolvedCallMetadata, ReturnShape};
use crate::request::AttributeValue;
use crate::transport::ExchangeOptions;
use std::sync::Arc;
use tracing::debug;

/// Executes calls of one declared method.
///
/// Built once per method per client by the executor cache. The executor does
/// not retry, does not enforce timeouts and does not catch errors: resolution
/// misuse, transport failures and extraction failures all reach the caller.
#[derive(Debug)]
pub struct Executor {
    metadata: Arc<ResolvedCallMetadata>,
}

impl Executor {
    #[must_use]
    pub const fn new(metadata: Arc<ResolvedCallMetadata>) -> Self {
        Self { metadata }
    }

    #[must_use]
    pub const fn metadata(&self) -> &Arc<ResolvedCallMetadata> {
        &self.metadata
    }

    /// Resolves `args`, dispatches through the selected transport and shapes
    /// the result.
    ///
    /// # Errors
    ///
    /// Returns misuse errors from resolution before the transport is
    /// touched, [`Error::TransportNotFound`] for an unregistered transport
    /// name, and any error raised by the transport or the result extractor.
    pub async fn execute(&self, client: &ApiClient, args: Vec<CallArg>) -> Result<CallOutput, Error> {
        let ResolvedRequest {
            descriptor,
            mut attributes,
        } = resolver::resolve(&self.metadata, args)?;

        attributes.insert(constants::ATTR_CLIENT, AttributeValue::Client(client.clone()));
        attributes.insert(
            constants::ATTR_CALL_METADATA,
            AttributeValue::Metadata(Arc::clone(&self.metadata)),
        );

        let transport = client.transports().resolve(self.metadata.transport())?;
        let options = ExchangeOptions {
            result_extractor: self.metadata.result_extractor().clone(),
            attributes,
        };

        debug!(
            target: "tether::executor",
            method = self.metadata.method_name(),
            return_shape = ?self.metadata.return_shape(),
            "dispatching"
        );
        let exchange = transport.exchange(descriptor, options).await?;

        match self.metadata.return_shape() {
            ReturnShape::Exchange => Ok(CallOutput::Exchange(exchange)),
            ReturnShape::Result => Ok(CallOutput::Result(exchange.extract_result().await?)),
        }
    }
}
