//! Catalog bootstrap from XML fragments.
//!
//! A value fragment looks like
//!
//! ```text
//! <item type="value" id="vFem" guid="...">
//!   <abbrev ws="en">f</abbrev>
//!   <term ws="en">feminine</term>
//!   <fs type="tAgr">
//!     <f name="fAgr">              <- complex feature (only when nested)
//!       <fs>                       <- optional @type, defaults to the enclosing one
//!         <f name="fGender">       <- closed feature (the innermost <f>)
//!           <sym value="vFem"/>
//!         </f>
//!       </fs>
//!     </f>
//!   </fs>
//! </item>
//! ```
//!
//! Types and features referenced by `@type` / `@name` are defined by their own
//! `item` elements (`type="fsType"` / `type="feature"`) elsewhere in the
//! document; those items supply the GUID and the localized labels.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use featsys_types::{FeatureId, MultiString, SymbolId, TypeId};

use super::xml::{CatalogDocument, CatalogNode};
use super::{FeatureCatalog, FeatureDefinition, Labels, StructureType, SymbolicValue};

/// Objects resolved by one value fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogImport {
    /// Innermost type, the one the closed feature was attached to
    pub structure_type: TypeId,
    /// Outermost complex feature, for nested fragments
    pub complex_feature: Option<FeatureId>,
    pub closed_feature: FeatureId,
    pub value: SymbolId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: Vec<CatalogImport>,
    /// Catalog ids (or positions) of fragments that were skipped
    pub skipped: Vec<String>,
    /// Objects added to the catalog by this run
    pub created: usize,
}

impl FeatureCatalog {
    /// Resolve (creating where needed) the structure type, features and
    /// symbolic value described by a catalog value item.
    ///
    /// Returns `None` when a required attribute (`@id`, `@guid`, `@type`) or a
    /// referenced definition is missing; whatever was resolved before that
    /// point stays in the catalog.
    pub fn get_or_create_feature_from_xml(
        &mut self,
        item: CatalogNode<'_>,
        writing_systems: &[String],
    ) -> Option<CatalogImport> {
        let doc = item.document();

        let Some(value_key) = item.attr("id") else {
            warn!("catalog value item without @id skipped");
            return None;
        };
        let value_guid = required_guid(item, value_key)?;

        let Some(fs) = item.child("fs") else {
            warn!(catalog_id = value_key, "catalog value item has no <fs>");
            return None;
        };
        let Some(type_key) = fs.attr("type") else {
            warn!(catalog_id = value_key, "catalog <fs> without @type skipped");
            return None;
        };
        let Some(outer_f) = fs.child("f") else {
            warn!(catalog_id = value_key, "catalog <fs> has no <f>");
            return None;
        };

        // Outside-in: each <f> wrapping another <fs> is a complex feature; the
        // first <f> without one is the closed feature.
        let mut structure_type = self.get_or_create_type_from_xml(doc, type_key, writing_systems)?;
        let mut complex_feature = None;
        let mut closed_node = outer_f;

        while let Some(inner_fs) = closed_node.child("fs") {
            let Some(complex_key) = closed_node.attr("name") else {
                warn!(catalog_id = value_key, "catalog <f> without @name skipped");
                return None;
            };
            let nested_type = match inner_fs.attr("type") {
                Some(key) => self.get_or_create_type_from_xml(doc, key, writing_systems)?,
                None => structure_type,
            };
            let complex = self.get_or_create_complex_feature_from_xml(
                doc,
                complex_key,
                nested_type,
                writing_systems,
            )?;
            if nested_type != structure_type {
                self.add_feature_to_type(structure_type, complex).ok()?;
            }
            complex_feature.get_or_insert(complex);
            structure_type = nested_type;

            let Some(inner_f) = inner_fs.child("f") else {
                warn!(catalog_id = value_key, "nested <fs> has no <f>");
                return None;
            };
            closed_node = inner_f;
        }

        let Some(closed_key) = closed_node.attr("name") else {
            warn!(catalog_id = value_key, "catalog <f> without @name skipped");
            return None;
        };
        let closed_feature =
            self.get_or_create_closed_feature_from_xml(doc, closed_key, writing_systems)?;
        self.add_feature_to_type(structure_type, closed_feature).ok()?;

        let value = self.get_or_create_symbolic_value_from_xml(
            item,
            value_key,
            value_guid,
            closed_feature,
            writing_systems,
        )?;

        Some(CatalogImport {
            structure_type,
            complex_feature,
            closed_feature,
            value,
        })
    }

    /// Run the bootstrap over every value item of a document
    pub fn import_catalog_values(
        &mut self,
        doc: &CatalogDocument,
        writing_systems: &[String],
    ) -> ImportSummary {
        let before = self.object_count();
        let mut summary = ImportSummary::default();

        for (position, item) in doc.items_of_type("value").enumerate() {
            match self.get_or_create_feature_from_xml(item, writing_systems) {
                Some(import) => summary.imported.push(import),
                None => summary.skipped.push(
                    item.attr("id")
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("#{}", position)),
                ),
            }
        }

        summary.created = self.object_count() - before;
        debug!(
            imported = summary.imported.len(),
            skipped = summary.skipped.len(),
            created = summary.created,
            "catalog import finished"
        );
        summary
    }

    fn object_count(&self) -> usize {
        self.feature_count() + self.structure_type_count() + self.symbolic_value_count()
    }

    fn get_or_create_type_from_xml(
        &mut self,
        doc: &CatalogDocument,
        type_key: &str,
        writing_systems: &[String],
    ) -> Option<TypeId> {
        if let Some(existing) = self.structure_type(type_key) {
            return Some(existing.id);
        }

        let Some(type_item) = doc.find_item(type_key, Some("fsType")) else {
            warn!(catalog_id = type_key, "no catalog item defines structure type");
            return None;
        };
        let guid = required_guid(type_item, type_key)?;

        // A type item nested in another type item is scoped under it.
        let parent = match type_item
            .ancestors()
            .find(|a| a.name() == "item" && a.attr("type") == Some("fsType"))
        {
            Some(parent_item) => {
                let Some(parent_key) = parent_item.attr("id") else {
                    warn!(catalog_id = type_key, "enclosing fsType item without @id, type skipped");
                    return None;
                };
                Some(self.get_or_create_type_from_xml(doc, parent_key, writing_systems)?)
            }
            None => None,
        };

        let mut structure_type =
            StructureType::new(labels_from_item(type_item, type_key, writing_systems))
                .with_id(TypeId::from_uuid(guid))
                .with_catalog_id(type_key);
        structure_type.parent = parent;
        Some(self.add_structure_type(structure_type))
    }

    fn get_or_create_complex_feature_from_xml(
        &mut self,
        doc: &CatalogDocument,
        feature_key: &str,
        structure_type: TypeId,
        writing_systems: &[String],
    ) -> Option<FeatureId> {
        let id = match self.feature(feature_key) {
            Some(existing) => existing.id,
            None => {
                let (guid, labels) = feature_item(doc, feature_key, writing_systems)?;
                self.add_feature(
                    FeatureDefinition::complex(labels, Some(structure_type))
                        .with_id(FeatureId::from_uuid(guid))
                        .with_catalog_id(feature_key),
                )
            }
        };

        let def = self.feature_by_id(id)?;
        if !def.is_complex() {
            warn!(catalog_id = feature_key, "catalog names a closed feature where a complex one is nested");
            return None;
        }
        if def.nested_type() != Some(structure_type) {
            debug!(
                catalog_id = feature_key,
                "complex feature keeps its first declared type"
            );
        }
        Some(id)
    }

    fn get_or_create_closed_feature_from_xml(
        &mut self,
        doc: &CatalogDocument,
        feature_key: &str,
        writing_systems: &[String],
    ) -> Option<FeatureId> {
        let id = match self.feature(feature_key) {
            Some(existing) => existing.id,
            None => {
                let (guid, labels) = feature_item(doc, feature_key, writing_systems)?;
                self.add_feature(
                    FeatureDefinition::closed(labels)
                        .with_id(FeatureId::from_uuid(guid))
                        .with_catalog_id(feature_key),
                )
            }
        };

        if !self.feature_by_id(id)?.is_closed() {
            warn!(catalog_id = feature_key, "catalog names a complex feature where a closed one is expected");
            return None;
        }
        Some(id)
    }

    fn get_or_create_symbolic_value_from_xml(
        &mut self,
        item: CatalogNode<'_>,
        value_key: &str,
        guid: Uuid,
        feature: FeatureId,
        writing_systems: &[String],
    ) -> Option<SymbolId> {
        let value = SymbolicValue::new(labels_from_item(item, value_key, writing_systems))
            .with_id(SymbolId::from_uuid(guid))
            .with_catalog_id(value_key);

        match self.add_symbolic_value(feature, value) {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(catalog_id = value_key, error = %err, "symbolic value skipped");
                None
            }
        }
    }
}

fn required_guid(node: CatalogNode<'_>, catalog_id: &str) -> Option<Uuid> {
    let Some(raw) = node.attr("guid") else {
        warn!(catalog_id, "catalog item without @guid skipped");
        return None;
    };
    match Uuid::parse_str(raw.trim()) {
        Ok(guid) => Some(guid),
        Err(err) => {
            warn!(catalog_id, guid = raw, error = %err, "catalog item with unreadable @guid skipped");
            None
        }
    }
}

fn feature_item(
    doc: &CatalogDocument,
    feature_key: &str,
    writing_systems: &[String],
) -> Option<(Uuid, Labels)> {
    let Some(item) = doc.find_item(feature_key, Some("feature")) else {
        warn!(catalog_id = feature_key, "no catalog item defines feature");
        return None;
    };
    let guid = required_guid(item, feature_key)?;
    Some((guid, labels_from_item(item, feature_key, writing_systems)))
}

/// Localized labels from the `abbrev`/`term`/`def` children of a catalog item.
/// Any label the item does not supply becomes the catalog id, replicated
/// into every analysis writing system.
fn labels_from_item(item: CatalogNode<'_>, catalog_id: &str, writing_systems: &[String]) -> Labels {
    let mut labels = Labels::default();
    for child in item.children() {
        let (Some(ws), text) = (child.attr("ws"), child.text()) else {
            continue;
        };
        if text.is_empty() {
            continue;
        }
        match child.name() {
            "abbrev" => labels.abbreviation.set(ws, text),
            "term" => labels.name.set(ws, text),
            "def" => labels.description.set(ws, text),
            _ => {}
        }
    }

    for label in [
        &mut labels.name,
        &mut labels.abbreviation,
        &mut labels.description,
    ] {
        if label.is_empty() {
            *label = MultiString::replicated(catalog_id, writing_systems);
        }
    }
    labels
}
