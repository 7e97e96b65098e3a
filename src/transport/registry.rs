//! Default and named transports for a client.

use super::{Transport, TransportRef};
use crate::constants;
use crate::error::Error;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Named transports plus the default used when metadata selects none.
#[derive(Clone)]
pub struct TransportRegistry {
    default: Arc<dyn Transport>,
    named: HashMap<String, Arc<dyn Transport>>,
}

impl TransportRegistry {
    pub fn new(default: impl Transport + 'static) -> Self {
        Self::from_shared(Arc::new(default))
    }

    #[must_use]
    pub fn from_shared(default: Arc<dyn Transport>) -> Self {
        Self {
            default,
            named: HashMap::new(),
        }
    }

    /// Registers a transport under `name`, replacing any earlier registration.
    #[must_use]
    pub fn with_transport(mut self, name: impl Into<String>, transport: impl Transport + 'static) -> Self {
        self.named.insert(name.into(), Arc::new(transport));
        self
    }

    #[must_use]
    pub fn with_shared(mut self, name: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        self.named.insert(name.into(), transport);
        self
    }

    #[must_use]
    pub fn default_transport(&self) -> &Arc<dyn Transport> {
        &self.default
    }

    /// Resolves a selector to a transport.
    ///
    /// `None` and the reserved name `default` select the default transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransportNotFound`] for unknown names.
    pub fn resolve(&self, selector: Option<&TransportRef>) -> Result<Arc<dyn Transport>, Error> {
        match selector {
            None => Ok(Arc::clone(&self.default)),
            Some(TransportRef::Shared(transport)) => Ok(Arc::clone(transport)),
            Some(TransportRef::Named(name)) => self.named.get(name).map_or_else(
                || {
                    if name == constants::DEFAULT_TRANSPORT {
                        Ok(Arc::clone(&self.default))
                    } else {
                        Err(Error::TransportNotFound { name: name.clone() })
                    }
                },
                |transport| Ok(Arc::clone(transport)),
            ),
        }
    }
}

impl fmt::Debug for TransportRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.named.keys().collect();
        names.sort();
        f.debug_struct("TransportRegistry")
            .field("named", &names)
            .finish_non_exhaustive()
    }
}
