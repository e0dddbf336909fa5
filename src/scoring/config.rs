//! Serializable weighting configuration and a named model registry.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::scoring::bm25f::Bm25f;
use crate::scoring::dfr::{DFree, Dlh13, InL2};
use crate::scoring::language_model::HiemstraLm;
use crate::scoring::tfidf::{Cosine, Frequency, TfIdf};
use crate::scoring::weighting::Weighting;

fn default_b() -> f64 {
    0.75
}

fn default_k1() -> f64 {
    1.2
}

fn default_dlh13_k() -> f64 {
    0.5
}

fn default_hiemstra_c() -> f64 {
    0.15
}

fn default_inl2_c() -> f64 {
    1.0
}

/// Configuration selecting a weighting model and its parameters.
///
/// The JSON form is tagged by `model`, e.g.
/// `{"model": "bm25f", "b": 0.75, "k1": 1.2, "field_b": {"title": 0.5}}`.
/// Omitted parameters take the model defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum WeightingConfig {
    Bm25f {
        #[serde(default = "default_b")]
        b: f64,
        #[serde(default = "default_k1")]
        k1: f64,
        #[serde(default)]
        field_b: BTreeMap<String, f64>,
        #[serde(default)]
        field_boost: BTreeMap<String, f64>,
    },
    Cosine,
    #[serde(rename = "dfree")]
    DFree,
    Dlh13 {
        #[serde(default = "default_dlh13_k")]
        k: f64,
    },
    HiemstraLm {
        #[serde(default = "default_hiemstra_c")]
        c: f64,
    },
    #[serde(rename = "inl2")]
    InL2 {
        #[serde(default = "default_inl2_c")]
        c: f64,
    },
    TfIdf,
    Frequency,
}

impl Default for WeightingConfig {
    fn default() -> Self {
        WeightingConfig::Bm25f {
            b: default_b(),
            k1: default_k1(),
            field_b: BTreeMap::new(),
            field_boost: BTreeMap::new(),
        }
    }
}

impl WeightingConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Instantiate the configured model.
    pub fn build(&self) -> Box<dyn Weighting> {
        match self {
            WeightingConfig::Bm25f {
                b,
                k1,
                field_b,
                field_boost,
            } => {
                let mut model = Bm25f::new(*b, *k1);
                for (field, value) in field_b {
                    model = model.with_field_b(field.as_str(), *value);
                }
                for (field, value) in field_boost {
                    model = model.with_field_boost(field.as_str(), *value);
                }
                Box::new(model)
            }
            WeightingConfig::Cosine => Box::new(Cosine),
            WeightingConfig::DFree => Box::new(DFree),
            WeightingConfig::Dlh13 { k } => Box::new(Dlh13::new(*k)),
            WeightingConfig::HiemstraLm { c } => Box::new(HiemstraLm::new(*c)),
            WeightingConfig::InL2 { c } => Box::new(InL2::new(*c)),
            WeightingConfig::TfIdf => Box::new(TfIdf),
            WeightingConfig::Frequency => Box::new(Frequency),
        }
    }
}

/// Registry of weighting models by name.
#[derive(Debug)]
pub struct WeightingRegistry {
    models: AHashMap<String, Box<dyn Weighting>>,
}

impl WeightingRegistry {
    /// Create a registry holding every built-in model with default parameters,
    /// each under its own [`Weighting::name`].
    pub fn new() -> Self {
        let mut registry = WeightingRegistry {
            models: AHashMap::new(),
        };

        let defaults: [Box<dyn Weighting>; 8] = [
            Box::new(Bm25f::default()),
            Box::new(Cosine),
            Box::new(DFree),
            Box::new(Dlh13::default()),
            Box::new(HiemstraLm::default()),
            Box::new(InL2::default()),
            Box::new(TfIdf),
            Box::new(Frequency),
        ];
        for model in defaults {
            let name = model.name();
            registry.register(name, model);
        }

        registry
    }

    /// Register a model, replacing any model with the same name.
    pub fn register(&mut self, name: &str, model: Box<dyn Weighting>) {
        self.models.insert(name.to_string(), model);
    }

    /// Get a model by name.
    pub fn get(&self, name: &str) -> Option<&dyn Weighting> {
        self.models.get(name).map(|model| model.as_ref())
    }

    /// List registered model names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for WeightingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
