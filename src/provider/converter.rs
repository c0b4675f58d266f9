//! Conversion facade over a print provider

use std::thread::{self, ThreadId};

use tracing::{debug, info};

use super::{BaseDevModeType, ConflictStatus, PrintTicketProvider, PrintTicketScope};
use crate::error::{Error, Result};

/// Highest Print Schema version clients may request
pub const MAX_SUPPORTED_VERSION: i32 = 1;

const OBJECT_NAME: &str = "PrintTicketConverter";

/// Thread-affine facade binding a device to a provider
///
/// Every public operation checks the calling thread and the release state
/// before reaching the provider. Scopes default to [`PrintTicketScope::Job`].
#[derive(Debug)]
pub struct PrintTicketConverter<P: PrintTicketProvider> {
    device_name: String,
    client_version: i32,
    provider: Option<P>,
    owner: ThreadId,
}

impl<P: PrintTicketProvider> PrintTicketConverter<P> {
    /// Bind `provider` to a device for a client schema version
    pub fn new(device_name: &str, client_version: i32, provider: P) -> Result<Self> {
        if device_name.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "device name must not be empty".to_string(),
            ));
        }
        if client_version <= 0 || client_version > MAX_SUPPORTED_VERSION {
            return Err(Error::out_of_range(
                "client_version",
                format!(
                    "version must be within [1, {}], got {}",
                    MAX_SUPPORTED_VERSION, client_version
                ),
            ));
        }
        info!(device = device_name, client_version, "converter bound");
        Ok(Self {
            device_name: device_name.to_string(),
            client_version,
            provider: Some(provider),
            owner: thread::current().id(),
        })
    }

    /// Highest Print Schema version clients may request
    pub fn max_print_schema_version() -> i32 {
        MAX_SUPPORTED_VERSION
    }

    /// Device this converter is bound to
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Schema version requested by the client
    pub fn client_version(&self) -> i32 {
        self.client_version
    }

    /// Whether [`release`](Self::release) has run
    pub fn is_released(&self) -> bool {
        self.provider.is_none()
    }

    fn check_thread(&self) -> Result<()> {
        if thread::current().id() != self.owner {
            return Err(Error::InvalidThreadAccess);
        }
        Ok(())
    }

    fn provider(&mut self) -> Result<&mut P> {
        self.check_thread()?;
        self.provider.as_mut().ok_or(Error::Disposed(OBJECT_NAME))
    }

    /// Convert a DEVMODE buffer to a ticket
    pub fn convert_devmode_to_ticket(
        &mut self,
        devmode: &[u8],
        scope: Option<PrintTicketScope>,
    ) -> Result<Vec<u8>> {
        let scope = scope.unwrap_or_default();
        let ticket = self.provider()?.devmode_to_ticket(devmode, scope)?;
        debug!(%scope, bytes = ticket.len(), "devmode converted to ticket");
        Ok(ticket)
    }

    /// Convert a ticket to a DEVMODE buffer on top of a default DEVMODE
    pub fn convert_ticket_to_devmode(
        &mut self,
        ticket: &[u8],
        base: BaseDevModeType,
        scope: Option<PrintTicketScope>,
    ) -> Result<Vec<u8>> {
        let scope = scope.unwrap_or_default();
        let devmode = self.provider()?.ticket_to_devmode(ticket, base, scope)?;
        debug!(%scope, ?base, bytes = devmode.len(), "ticket converted to devmode");
        Ok(devmode)
    }

    /// Merge a delta ticket into a base ticket and validate the result
    pub fn merge_and_validate(
        &mut self,
        base_ticket: &[u8],
        delta_ticket: Option<&[u8]>,
        scope: Option<PrintTicketScope>,
    ) -> Result<(Vec<u8>, ConflictStatus)> {
        let scope = scope.unwrap_or_default();
        let (merged, status) = self
            .provider()?
            .merge_and_validate(base_ticket, delta_ticket, scope)?;
        debug!(%scope, ?status, "tickets merged");
        Ok((merged, status))
    }

    /// Capabilities of the device, optionally relative to a base ticket
    pub fn get_print_capabilities(&mut self, base_ticket: Option<&[u8]>) -> Result<Vec<u8>> {
        Ok(self.provider()?.get_capabilities(base_ticket)?)
    }

    /// Release the provider; later calls fail with [`Error::Disposed`]
    ///
    /// Releasing twice is a no-op.
    pub fn release(&mut self) -> Result<()> {
        self.check_thread()?;
        self.release_provider();
        Ok(())
    }

    fn release_provider(&mut self) {
        if let Some(mut provider) = self.provider.take() {
            provider.release();
            info!(device = %self.device_name, "converter released");
        }
    }
}

impl<P: PrintTicketProvider> Drop for PrintTicketConverter<P> {
    fn drop(&mut self) {
        self.release_provider();
    }
}
