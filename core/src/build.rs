//! Schema build pipeline.
//!
//! [`SchemaBuilder`] runs one document set start to finish: infer every
//! document, reconcile the environment trees, put the constants tree in
//! front, reject an empty result and finalize generated names.
//!
//! # Example
//!
//! ```
//! use configgen_core::*;
//!
//! let doc = |name: &str, json: serde_json::Value| Document::new(name, Value::from(json));
//!
//! let schema = SchemaBuilder::new(ReconcileMode::Intersect)
//!     .constants(doc("value.toml", serde_json::json!({"app": {"name": "svc"}})))
//!     .environment(doc("config_dev.toml", serde_json::json!({"server": {"port": 1, "debug": true}})))
//!     .environment(doc("config_prod.toml", serde_json::json!({"server": {"port": 2}})))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.len(), 2);
//! assert!(schema.get("server.port").is_some());
//! assert!(schema.get("server.debug").is_none());
//! assert_eq!(schema.get("app").unwrap().struct_name.as_deref(), Some("App"));
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::{Document, Field, Fields, ReconcileMode, finalize, infer_document, kind_conflicts};

/// The canonical, finalized schema handed to code generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Fields,
}

impl Schema {
    /// Top-level fields, sorted by key.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Looks up a field by dotted key path (`server.port`).
    pub fn get(&self, path: &str) -> Option<&Field> {
        let mut segments = path.split('.');
        let mut field = self.fields.get(segments.next()?)?;
        for segment in segments {
            field = field.children()?.get(segment)?;
        }
        Some(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Collects the documents of one run and builds the schema from them.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    mode: ReconcileMode,
    strict_kinds: bool,
    constants: Option<Document>,
    environments: Vec<Document>,
    local_override: Option<Document>,
}

impl SchemaBuilder {
    pub fn new(mode: ReconcileMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Sets the constants document, unioned in front of the environment schema.
    pub fn constants(mut self, document: Document) -> Self {
        self.constants = Some(document);
        self
    }

    /// Adds an environment document. Order matters for `Union` and `Merge`.
    pub fn environment(mut self, document: Document) -> Self {
        self.environments.push(document);
        self
    }

    /// Sets the local override layer. Only `Merge` uses it, as the last layer.
    pub fn local_override(mut self, document: Document) -> Self {
        self.local_override = Some(document);
        self
    }

    /// Rejects kind conflicts between documents instead of resolving them.
    pub fn strict_kinds(mut self, strict: bool) -> Self {
        self.strict_kinds = strict;
        self
    }

    /// Builds the finalized schema.
    ///
    /// # Errors
    ///
    /// Returns the first inference error of any document, a
    /// [`SchemaError::KindConflict`] in strict mode, [`SchemaError::EmptySchema`]
    /// when no field survives reconciliation, and any naming error from
    /// [`finalize`].
    pub fn build(self) -> Result<Schema> {
        let constants = self.constants.as_ref().map(infer).transpose()?;

        let mut layers = self
            .environments
            .iter()
            .map(infer)
            .collect::<Result<Vec<_>>>()?;
        if self.mode == ReconcileMode::Merge {
            if let Some(local) = &self.local_override {
                layers.push(infer(local)?);
            }
        }

        if self.strict_kinds {
            check_conflicts(&layers)?;
        }
        let env_schema = (!layers.is_empty()).then(|| self.mode.apply(&layers));

        let mut fields = match (constants, env_schema) {
            (Some(constants), Some(env)) => {
                let parts = [constants, env];
                if self.strict_kinds {
                    check_conflicts(&parts)?;
                }
                crate::union(&parts)
            }
            (Some(constants), None) => constants,
            (None, Some(env)) => env,
            (None, None) => Fields::new(),
        };

        if fields.is_empty() {
            return Err(SchemaError::EmptySchema);
        }
        finalize(&mut fields)?;
        Ok(Schema { fields })
    }
}

fn infer(document: &Document) -> Result<Fields> {
    infer_document(&document.value, &document.comments).map_err(|err| match err {
        SchemaError::NotAnObject { found, .. } => SchemaError::NotAnObject {
            document: document.name.clone(),
            found,
        },
        SchemaError::UnsupportedValue { path, found } => SchemaError::UnsupportedValue {
            path: format!("{}: {path}", document.name),
            found,
        },
        other => other,
    })
}

fn check_conflicts(trees: &[Fields]) -> Result<()> {
    match kind_conflicts(trees).into_iter().next() {
        Some(conflict) => Err(SchemaError::KindConflict {
            path: conflict.path,
            first: conflict.first,
            second: conflict.second,
        }),
        None => Ok(()),
    }
}
