//! Extra arguments captured for host callbacks.

// Internal dependencies
use crate::host::value::{HostValue, Keywords};
use crate::primitives::errors::{BindError, BindResult};

/// Extra positional and keyword arguments appended to every host callback call.
///
/// Validated once when the kernel is negotiated and never modified afterwards.
#[derive(Debug, Clone, Default)]
pub struct CallbackContext {
    extra_arguments: Vec<HostValue>,
    extra_keywords: Keywords,
}

impl CallbackContext {
    /// Capture the host's `extra_arguments` tuple and `extra_keywords` dict.
    pub fn from_host(extra_arguments: &HostValue, extra_keywords: &HostValue) -> BindResult<Self> {
        let HostValue::Tuple(arguments) = extra_arguments else {
            return Err(BindError::InvalidArgument(
                "extra_arguments must be a tuple".into(),
            ));
        };
        let HostValue::Dict(keywords) = extra_keywords else {
            return Err(BindError::InvalidArgument(
                "extra_keywords must be a dictionary".into(),
            ));
        };
        Ok(Self {
            extra_arguments: arguments.clone(),
            extra_keywords: keywords.clone(),
        })
    }

    /// Build a context directly from owned parts.
    pub fn new(extra_arguments: Vec<HostValue>, extra_keywords: Keywords) -> Self {
        Self {
            extra_arguments,
            extra_keywords,
        }
    }

    /// `leading` followed by the extra positional arguments.
    pub fn arguments_with(&self, leading: Vec<HostValue>) -> Vec<HostValue> {
        let mut args = leading;
        args.extend(self.extra_arguments.iter().cloned());
        args
    }

    /// Extra positional arguments.
    pub fn extra_arguments(&self) -> &[HostValue] {
        &self.extra_arguments
    }

    /// Extra keyword arguments.
    pub fn keywords(&self) -> &Keywords {
        &self.extra_keywords
    }
}
