//! Property panel rows for a single prim

use stage::{AttributeInfo, PrimPath, SceneGraph};

use crate::adapter::SceneNodeAdapter;
use crate::classify::{classify, AttributeMeta, ColorClass};
use crate::error::TreeResult;

/// One attribute as shown in the property panel
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRow {
    pub name: String,
    pub type_name: String,
    /// Default value as text, empty when only time samples are authored
    pub value: String,
    pub class: ColorClass,
    pub time_sampled: bool,
}

impl PropertyRow {
    fn from_attribute(attribute: &AttributeInfo) -> Self {
        Self {
            name: attribute.name.clone(),
            type_name: attribute.type_name.clone(),
            value: attribute
                .value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_default(),
            class: classify(&AttributeMeta::from(attribute)),
            time_sampled: attribute.has_time_samples(),
        }
    }

    pub fn is_primvar(&self) -> bool {
        self.name.starts_with("primvars:")
    }
}

/// One authored time sample
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSampleRow {
    pub attribute: String,
    pub time: f64,
    pub value: String,
}

impl<'a, S: SceneGraph + ?Sized> SceneNodeAdapter<'a, S> {
    /// Attributes of a prim, plain attributes first and primvars after
    ///
    /// Authored order is kept within each group.
    pub fn properties(&self, path: &PrimPath) -> TreeResult<Vec<PropertyRow>> {
        let (primvars, attributes): (Vec<PropertyRow>, Vec<PropertyRow>) = self
            .attributes(path)?
            .iter()
            .map(PropertyRow::from_attribute)
            .partition(PropertyRow::is_primvar);
        Ok(attributes.into_iter().chain(primvars).collect())
    }

    /// Every time sample of every time-sampled attribute, by attribute then time
    pub fn time_samples(&self, path: &PrimPath) -> TreeResult<Vec<TimeSampleRow>> {
        Ok(self
            .attributes(path)?
            .iter()
            .flat_map(|attribute| {
                attribute.time_samples.iter().map(|sample| TimeSampleRow {
                    attribute: attribute.name.clone(),
                    time: sample.time,
                    value: sample.value.to_string(),
                })
            })
            .collect())
    }
}
