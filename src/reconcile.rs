//! Field reconciliation
//!
//! Folds freshly extracted fields into the [`FieldCatalog`], one service at a
//! time. A field either merges into the entry of the same name, or, when the
//! shapes are incompatible, into a service-specific fork `<name>_<service>`.
//!
//! ```text
//! extracted field ──► empty object list? ──yes──► dropped
//!                          │ no
//!                          ▼
//!                 catalog[name] absent ──────────► insert
//!                          │ present
//!                          ▼
//!                 compatible? ──yes──► merge into catalog[name]
//!                          │ no
//!                          ▼
//!                 catalog[name_service] absent ──► insert fork
//!                          │ present
//!                          ▼
//!                 compatible? ──yes──► merge into fork
//!                          │ no
//!                          ▼
//!                 IrreconcilableField (run aborts)
//! ```

use std::collections::BTreeMap;

use tracing::debug;

use crate::catalog::FieldCatalog;
use crate::changelog::ChangeLog;
use crate::error::{GeneratorError, Result};
use crate::extract::select_item_key;
use crate::field::{ConfigField, FieldValueType};

/// Result of reconciling one or more services
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOutcome {
    /// Whether the catalog changed
    pub updated: bool,
    /// Fields introduced or merged, by path
    pub change_log: ChangeLog,
}

/// A merged field and whether it differs from the existing entry
#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    pub field: ConfigField,
    pub changed: bool,
}

/// Whether `incoming` can be merged into `existing` without a fork.
///
/// Types must match. Object lists are additionally compatible only when
/// every sub-field present on both sides is itself compatible.
pub fn able_to_merge(incoming: &ConfigField, existing: &ConfigField) -> bool {
    if incoming.field_value_type != existing.field_value_type {
        return false;
    }
    if incoming.field_value_type != FieldValueType::ObjectList {
        return true;
    }
    incoming.item_fields.iter().all(|(name, sub)| {
        existing
            .item_fields
            .get(name)
            .map_or(true, |current| able_to_merge(sub, current))
    })
}

/// Merge `incoming` into a copy of `existing`.
///
/// Sub-fields are merged recursively; new sub-fields are added as-is and
/// logged under `path.sub`. The per-service description and item type maps
/// are unioned with `incoming` winning on conflict. An object list without
/// an item key gets one selected once new sub-fields arrive. A field whose
/// own data changed is logged under `path` with its merged value.
pub fn merge_fields(
    existing: &ConfigField,
    incoming: &ConfigField,
    path: &str,
    log: &mut ChangeLog,
) -> MergeResult {
    let mut merged = existing.clone();
    let mut changed = false;
    let mut added_sub_fields = false;

    if existing.field_value_type == FieldValueType::ObjectList {
        for (name, sub) in &incoming.item_fields {
            let sub_path = format!("{}.{}", path, name);
            match existing.item_fields.get(name) {
                Some(current) => {
                    let result = merge_fields(current, sub, &sub_path, log);
                    changed |= result.changed;
                    merged.item_fields.insert(name.clone(), result.field);
                }
                None => {
                    merged.item_fields.insert(name.clone(), sub.clone());
                    log.record(sub_path, sub.clone());
                    changed = true;
                    added_sub_fields = true;
                }
            }
        }
    }

    let mut own_changed = union_into(&mut merged.description, &incoming.description)
        | union_into(&mut merged.item_type, &incoming.item_type);

    if added_sub_fields && merged.item_key_field.is_none() {
        merged.item_key_field = select_item_key(path, &merged.item_fields);
        own_changed |= merged.item_key_field.is_some();
    }
    if own_changed {
        log.record(path, merged.clone());
    }

    MergeResult {
        field: merged,
        changed: changed || own_changed,
    }
}

fn union_into<V: Clone + PartialEq>(target: &mut BTreeMap<String, V>, source: &BTreeMap<String, V>) -> bool {
    let mut changed = false;
    for (key, value) in source {
        if target.get(key) != Some(value) {
            target.insert(key.clone(), value.clone());
            changed = true;
        }
    }
    changed
}

/// Applies extracted fields to a borrowed catalog.
///
/// If an error is returned the catalog may be partially reconciled and
/// should be discarded rather than persisted.
pub struct Reconciler<'c> {
    catalog: &'c mut FieldCatalog,
    outcome: ReconcileOutcome,
}

impl<'c> Reconciler<'c> {
    pub fn new(catalog: &'c mut FieldCatalog) -> Self {
        Self {
            catalog,
            outcome: ReconcileOutcome::default(),
        }
    }

    /// Reconcile every extracted field of one service
    pub fn reconcile_service(
        &mut self,
        service: &str,
        fields: BTreeMap<String, ConfigField>,
    ) -> Result<()> {
        for (name, field) in fields {
            self.reconcile_field(service, name, field)?;
        }
        Ok(())
    }

    /// Reconcile a single field of `service`
    pub fn reconcile_field(&mut self, service: &str, name: String, field: ConfigField) -> Result<()> {
        if field.is_empty_object_list() {
            debug!(field = %name, service, "Skipping object list without item fields");
            return Ok(());
        }

        match self.catalog.get(&name) {
            None => {
                debug!(field = %name, service, "New field");
                self.outcome.change_log.record(name.clone(), field.clone());
                self.catalog.insert(name, field);
                self.outcome.updated = true;
            }
            Some(existing) if able_to_merge(&field, existing) => {
                let result = merge_fields(existing, &field, &name, &mut self.outcome.change_log);
                if result.changed {
                    debug!(field = %name, service, "Merged field");
                    self.catalog.insert(name, result.field);
                    self.outcome.updated = true;
                }
            }
            Some(_) => self.fork(service, name, field)?,
        }
        Ok(())
    }

    fn fork(&mut self, service: &str, name: String, mut field: ConfigField) -> Result<()> {
        let fork_name = format!("{}_{}", name, service);

        match self.catalog.get(&fork_name) {
            Some(existing) => {
                if !able_to_merge(&field, existing) {
                    return Err(GeneratorError::IrreconcilableField {
                        field: name,
                        service: service.to_string(),
                        fork: fork_name,
                    });
                }

                let mut result = merge_fields(existing, &field, &fork_name, &mut self.outcome.change_log);
                if result.field.api_field.as_deref() != Some(name.as_str()) {
                    result.field.api_field = Some(name);
                    result.changed = true;
                }

                if result.changed && !result.field.is_empty_object_list() {
                    debug!(field = %fork_name, service, "Merged forked field");
                    self.outcome.change_log.record(fork_name.clone(), result.field.clone());
                    self.catalog.insert(fork_name, result.field);
                    self.outcome.updated = true;
                }
            }
            None => {
                debug!(field = %name, fork = %fork_name, service, "Forking incompatible field");
                field.api_field = Some(name);
                self.outcome.change_log.record(fork_name.clone(), field.clone());
                self.catalog.insert(fork_name, field);
                self.outcome.updated = true;
            }
        }
        Ok(())
    }

    pub fn finish(self) -> ReconcileOutcome {
        self.outcome
    }
}

/// Reconcile services in the given order against `catalog`
pub fn reconcile<I>(catalog: &mut FieldCatalog, services: I) -> Result<ReconcileOutcome>
where
    I: IntoIterator<Item = (String, BTreeMap<String, ConfigField>)>,
{
    let mut reconciler = Reconciler::new(catalog);
    for (service, fields) in services {
        reconciler.reconcile_service(&service, fields)?;
    }
    Ok(reconciler.finish())
}
