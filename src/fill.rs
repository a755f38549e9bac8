//! The resolution pass: every field of a record, in declaration order.
//!
//! For each field:
//!
//! 1. Read the lookup key and optionality from its tags. Untagged fields are
//!    skipped without a report.
//! 2. Ask the sources, in priority order, for the key.
//! 3. Convert the value into the field, or fall back to the field's current
//!    value if the key is optional and missing everywhere.
//!
//! The first failure aborts the pass. Fields set before it keep their new
//! values and entries already reported stay reported.

use std::collections::HashSet;

use crate::coerce::{Value, coerce};
use crate::error::LookfigError;
use crate::chain::resolve;
use crate::record::{Field, Record};
use crate::report::{Discard, Reporter};
use crate::source::Source;
use crate::tags::extract;

/// Populate `record` from `sources`, reporting each set or defaulted field.
///
/// `sources` are in priority order: earlier sources win. With no reporter,
/// entries are discarded.
pub fn fill<R: Record + ?Sized>(
    record: &mut R,
    reporter: Option<&mut dyn Reporter>,
    sources: &[&dyn Source],
) -> Result<(), LookfigError> {
    let mut discard = Discard;
    let reporter = reporter.unwrap_or(&mut discard);

    let mut fields = record.fields();
    check_names(&fields)?;

    for field in &mut fields {
        fill_field(field, reporter, sources)?;
    }
    Ok(())
}

fn check_names(fields: &[Field<'_>]) -> Result<(), LookfigError> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.name) {
            return Err(LookfigError::InvalidRecord {
                reason: format!("field '{}' is listed more than once", field.name),
            });
        }
    }
    Ok(())
}

fn fill_field(
    field: &mut Field<'_>,
    reporter: &mut dyn Reporter,
    sources: &[&dyn Source],
) -> Result<(), LookfigError> {
    let Some(key) = extract(field.name, &field.tags) else {
        tracing::trace!(field = field.name, "no lookup tag, skipping");
        return Ok(());
    };

    let raw = resolve(key.key, sources.iter().copied()).map_err(|source| {
        LookfigError::SourceLookupFailed {
            field: field.name,
            source,
        }
    })?;

    let Some(raw) = raw else {
        if !key.optional {
            return Err(LookfigError::MissingRequiredField {
                field: field.name,
                key: key.key.to_string(),
            });
        }
        tracing::debug!(
            field = field.name,
            key = key.key,
            "optional key not found, keeping default"
        );
        reporter.report(key.key, &Value::Missing);
        return Ok(());
    };

    let value = coerce(&raw, &mut field.slot).map_err(|e| LookfigError::TypeCoercionFailed {
        field: field.name,
        value: raw,
        target: e.target,
        reason: e.reason,
    })?;
    tracing::debug!(field = field.name, key = key.key, "field set");
    reporter.report(key.key, &value);
    Ok(())
}
