//! Detection of dependency cycles within a single top-level instantiation.

use crate::config::{ContainerConfig, CycleDetection};
use crate::error::InstantiationError;
use crate::metadata::TypeMetadata;
use fxhash::FxHashMap;
use itertools::Itertools;
use std::any::TypeId;

/// Tracks implementations resolved during one top-level instantiation. Must be
/// [reset](ResolutionGuard::reset) before each top-level request.
#[derive(Clone, Debug)]
pub struct ResolutionGuard {
    strategy: CycleDetection,
    recursion_bound: u32,
    path: Vec<(TypeId, &'static str)>,
    counters: FxHashMap<TypeId, (u32, &'static str)>,
}

impl ResolutionGuard {
    pub fn new(config: &ContainerConfig) -> Self {
        Self {
            strategy: config.cycle_detection,
            recursion_bound: config.recursion_bound,
            path: Default::default(),
            counters: Default::default(),
        }
    }

    pub fn reset(&mut self) {
        self.path.clear();
        self.counters.clear();
    }

    /// Records that given implementation is about to be provided. Every successful call must be
    /// paired with [ResolutionGuard::leave].
    pub fn enter(&mut self, metadata: &TypeMetadata) -> Result<(), InstantiationError> {
        match self.strategy {
            CycleDetection::ResolutionPath => self.enter_path(metadata),
            CycleDetection::RecursionCounter => self.enter_counter(metadata),
        }
    }

    /// Records that given implementation has been provided, successfully or not.
    pub fn leave(&mut self, metadata: &TypeMetadata) {
        if self.strategy == CycleDetection::ResolutionPath {
            if let Some(position) = self
                .path
                .iter()
                .rposition(|(type_id, _)| *type_id == metadata.type_id)
            {
                self.path.truncate(position);
            }
        }
    }

    fn enter_path(&mut self, metadata: &TypeMetadata) -> Result<(), InstantiationError> {
        if let Some(position) = self
            .path
            .iter()
            .position(|(type_id, _)| *type_id == metadata.type_id)
        {
            return Err(InstantiationError::CyclicDependency(
                self.path[position..]
                    .iter()
                    .map(|(_, name)| name.to_string())
                    .sorted()
                    .collect(),
            ));
        }

        self.path.push((metadata.type_id, metadata.type_name));
        Ok(())
    }

    fn enter_counter(&mut self, metadata: &TypeMetadata) -> Result<(), InstantiationError> {
        let (count, _) = self
            .counters
            .entry(metadata.type_id)
            .or_insert((0, metadata.type_name));
        *count += 1;

        if *count <= self.recursion_bound {
            return Ok(());
        }

        let threshold = self.recursion_bound.saturating_sub(1);
        Err(InstantiationError::CyclicDependency(
            self.counters
                .values()
                .filter(|(count, _)| *count >= threshold)
                .map(|(_, name)| name.to_string())
                .sorted()
                .collect(),
        ))
    }
}
