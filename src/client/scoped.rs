//! Scoped session guard.
//!
//! [`ScopedSession`] connects on creation and disconnects when dropped, so
//! an early return or a panic in the caller's block still closes the
//! socket.
//!
//! # Example
//!
//! ```no_run
//! use directa_session::DirectaClient;
//!
//! # async fn example() -> directa_session::Result<()> {
//! let mut client = DirectaClient::builder().build()?;
//! {
//!     let mut session = client.session().await?;
//!     session.send("INFOSTOCKS").await?;
//! } // disconnected here
//! # Ok(())
//! # }
//! ```

use std::ops::{Deref, DerefMut};

use crate::error::Result;

use super::core::DirectaClient;

/// Connected client that disconnects on drop.
#[derive(Debug)]
pub struct ScopedSession<'a> {
    client: &'a mut DirectaClient,
}

impl DirectaClient {
    /// Connects and returns a guard that disconnects when dropped.
    ///
    /// # Errors
    ///
    /// Returns the connect error; nothing is held in that case.
    pub async fn session(&mut self) -> Result<ScopedSession<'_>> {
        self.connect().await?;
        Ok(ScopedSession { client: self })
    }
}

impl Deref for ScopedSession<'_> {
    type Target = DirectaClient;

    fn deref(&self) -> &Self::Target {
        self.client
    }
}

impl DerefMut for ScopedSession<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.client
    }
}

impl Drop for ScopedSession<'_> {
    fn drop(&mut self) {
        self.client.disconnect();
    }
}
