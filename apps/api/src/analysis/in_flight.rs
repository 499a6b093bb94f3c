//! In-flight registry — request id → cancellation token for analyses that
//! are still running. Entries live exactly as long as their `InFlightGuard`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Clone, Default)]
pub struct InFlightRegistry {
    tokens: Arc<Mutex<HashMap<Uuid, CancellationToken>>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new analysis. Fails if the id is already running.
    pub fn register(&self, request_id: Uuid) -> Result<InFlightGuard, AppError> {
        let mut tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        if tokens.contains_key(&request_id) {
            return Err(AppError::Validation(format!(
                "An analysis with request_id {request_id} is already running"
            )));
        }

        let token = CancellationToken::new();
        tokens.insert(request_id, token.clone());

        Ok(InFlightGuard {
            registry: self.clone(),
            request_id,
            token,
        })
    }

    /// Cancels a running analysis. Returns false if the id is unknown.
    pub fn cancel(&self, request_id: Uuid) -> bool {
        let tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        match tokens.get(&request_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn is_running(&self, request_id: Uuid) -> bool {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&request_id)
    }

    fn remove(&self, request_id: Uuid) {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&request_id);
    }
}

/// Removes its registry entry on drop, including when the request future
/// is dropped because the client went away.
pub struct InFlightGuard {
    registry: InFlightRegistry,
    request_id: Uuid,
    token: CancellationToken,
}

impl InFlightGuard {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry.remove(self.request_id);
    }
}
