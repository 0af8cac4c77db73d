//! Per-layer table providers.
//!
//! The interpolation engine asks a [`LayerTableProvider`] for the overlap and
//! hex-center tables of each layer that has hits. Production code reads them
//! from disk (see `meshinterp-io`); tests use [`InMemoryTables`].

use crate::geometry::LayerTables;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Source of per-layer overlap and hex-center tables.
pub trait LayerTableProvider: Send + Sync {
    /// Returns the tables of a nominal layer.
    ///
    /// # Errors
    /// Returns [`Error::TableLoad`] if the tables cannot be produced.
    fn layer_tables(&self, layer: u32) -> Result<Arc<LayerTables>>;

    /// Returns the name of the provider.
    fn name(&self) -> &'static str;
}

/// Tables held in memory, keyed by layer.
#[derive(Debug, Default)]
pub struct InMemoryTables {
    layers: HashMap<u32, Arc<LayerTables>>,
    requested: Mutex<Vec<u32>>,
}

impl InMemoryTables {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the tables of `tables.layer`.
    pub fn insert(&mut self, tables: LayerTables) {
        self.layers.insert(tables.layer, Arc::new(tables));
    }

    /// Builder-style variant of [`Self::insert`].
    #[must_use]
    pub fn with_layer(mut self, tables: LayerTables) -> Self {
        self.insert(tables);
        self
    }

    /// Layers requested so far, in request order.
    #[must_use]
    pub fn requested_layers(&self) -> Vec<u32> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LayerTableProvider for InMemoryTables {
    fn layer_tables(&self, layer: u32) -> Result<Arc<LayerTables>> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(layer);
        self.layers
            .get(&layer)
            .cloned()
            .ok_or_else(|| Error::TableLoad {
                layer,
                message: "no tables registered".to_string(),
            })
    }

    fn name(&self) -> &'static str {
        "InMemory"
    }
}

/// Memoizing wrapper: each layer is loaded from the inner provider at most
/// once and shared afterwards.
pub struct CachedTableProvider<P> {
    inner: P,
    cache: RwLock<HashMap<u32, Arc<LayerTables>>>,
}

impl<P: LayerTableProvider> CachedTableProvider<P> {
    /// Wraps a provider.
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of layers currently cached.
    pub fn cached_layers(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drops all cached tables.
    pub fn clear(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<P: LayerTableProvider> LayerTableProvider for CachedTableProvider<P> {
    fn layer_tables(&self, layer: u32) -> Result<Arc<LayerTables>> {
        if let Some(tables) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&layer)
        {
            return Ok(Arc::clone(tables));
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have loaded it while we waited for the lock.
        if let Some(tables) = cache.get(&layer) {
            return Ok(Arc::clone(tables));
        }
        let tables = self.inner.layer_tables(layer)?;
        log::debug!(
            "cached tables for layer {layer} from {} ({} cells)",
            self.inner.name(),
            tables.len()
        );
        cache.insert(layer, Arc::clone(&tables));
        Ok(tables)
    }

    fn name(&self) -> &'static str {
        "Cached"
    }
}
