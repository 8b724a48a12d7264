//! Thread-safe handle around a [`Harmony`].
//!
//! The registries themselves are plain owned values. `SharedHarmony` puts one
//! `Harmony` behind an `Arc<RwLock<_>>` so several threads can read
//! concurrently while writers are serialized.

use std::sync::{Arc, RwLock};

use crate::error::HarmonyError;
use crate::harmony::Harmony;

/// Cloneable handle; every clone refers to the same `Harmony`.
#[derive(Debug, Clone, Default)]
pub struct SharedHarmony {
    inner: Arc<RwLock<Harmony>>,
}

impl SharedHarmony {
    pub fn new(harmony: Harmony) -> Self {
        Self { inner: Arc::new(RwLock::new(harmony)) }
    }

    /// Runs `f` under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&Harmony) -> R) -> Result<R, HarmonyError> {
        let guard = self.inner.read().map_err(|_| HarmonyError::LockPoisoned)?;
        Ok(f(&guard))
    }

    /// Runs `f` under the write lock.
    pub fn write<R>(&self, f: impl FnOnce(&mut Harmony) -> R) -> Result<R, HarmonyError> {
        let mut guard = self.inner.write().map_err(|_| HarmonyError::LockPoisoned)?;
        Ok(f(&mut guard))
    }

    /// Unwraps the `Harmony` if this is the last handle; otherwise gives the
    /// handle back.
    pub fn into_inner(self) -> Result<Harmony, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(lock) => Ok(lock.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())),
            Err(inner) => Err(Self { inner }),
        }
    }
}

impl From<Harmony> for SharedHarmony {
    fn from(harmony: Harmony) -> Self {
        Self::new(harmony)
    }
}
