//! Structured records handed to persistence collaborators
//!
//! Every serializable thing becomes a [`Record`]:
//! - `type`: the kind of thing, checked on the way back in
//! - `data`: flat numeric fields, each a short list of numbers
//! - `subs`: named nested records (a frame's rotation, a body's frame)
//!
//! The concrete text or binary encoding is up to the caller; records derive
//! serde traits so any serde format works.

use std::collections::BTreeMap;

use nalgebra::Quaternion;
use serde::{Deserialize, Serialize};

use super::error::{Result, SimError};
use super::states::{NVec3, Quat};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: BTreeMap<String, Vec<f64>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subs: BTreeMap<String, Record>,
}

impl Record {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: BTreeMap::new(),
            subs: BTreeMap::new(),
        }
    }

    pub fn with_data(mut self, key: &str, values: impl IntoIterator<Item = f64>) -> Self {
        self.data.insert(key.to_owned(), values.into_iter().collect());
        self
    }

    pub fn with_sub(mut self, key: &str, sub: Record) -> Self {
        self.subs.insert(key.to_owned(), sub);
        self
    }

    pub fn expect_type(&self, kind: &str) -> Result<()> {
        if self.kind == kind {
            Ok(())
        } else {
            Err(SimError::malformed(format!(
                "expected a {kind} record, found {}",
                self.kind
            )))
        }
    }

    pub fn sub(&self, key: &str) -> Result<&Record> {
        self.subs.get(key).ok_or_else(|| {
            SimError::malformed(format!("{} record has no `{key}` sub-record", self.kind))
        })
    }

    /// Field `key` as exactly `N` finite numbers
    fn fixed<const N: usize>(&self, key: &str) -> Result<[f64; N]> {
        let values = self.data.get(key).ok_or_else(|| {
            SimError::malformed(format!("{} record has no `{key}` field", self.kind))
        })?;
        let fixed: [f64; N] = values.as_slice().try_into().map_err(|_| {
            SimError::malformed(format!(
                "{}.{key} needs {N} values, found {}",
                self.kind,
                values.len()
            ))
        })?;
        if fixed.iter().any(|v| !v.is_finite()) {
            return Err(SimError::malformed(format!("{}.{key} is not finite", self.kind)));
        }
        Ok(fixed)
    }

    pub fn scalar(&self, key: &str) -> Result<f64> {
        let [value] = self.fixed::<1>(key)?;
        Ok(value)
    }

    pub fn vector(&self, key: &str) -> Result<NVec3> {
        let [x, y, z] = self.fixed::<3>(key)?;
        Ok(NVec3::new(x, y, z))
    }

    /// Field `key` as `[w, i, j, k]`, renormalized to a unit quaternion
    pub fn quaternion(&self, key: &str) -> Result<Quat> {
        let [w, i, j, k] = self.fixed::<4>(key)?;
        let raw = Quaternion::new(w, i, j, k);
        if raw.norm() == 0.0 {
            return Err(SimError::malformed(format!("{}.{key} is a zero quaternion", self.kind)));
        }
        Ok(Quat::from_quaternion(raw))
    }
}
