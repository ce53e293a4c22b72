//! The complete game content: technologies, research, buildings,
//! credit actions and starting specialists.

use serde::{Deserialize, Serialize};

use super::action_data::ActionData;
use super::building_data::BuildingData;
use super::research_data::ResearchData;
use super::starter_data::StarterData;
use super::tech_data::TechData;
use crate::actions::ActionBook;
use crate::buildings::Buildings;
use crate::error::{EconomyError, Result};
use crate::team::Specialist;
use crate::unlocks::{NodeId, UnlockGraph};

/// Content shipped with the crate.
const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.ron");

/// Complete content definition, loaded from RON.
///
/// # Example RON
///
/// ```ron
/// Catalog(
///     technologies: [...],
///     research: [...],
///     buildings: [...],
///     actions: [...],
///     starters: [...],
/// )
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    /// Instant unlock nodes.
    pub technologies: Vec<TechData>,
    /// Time-gated unlock nodes.
    pub research: Vec<ResearchData>,
    /// Building blueprints.
    pub buildings: Vec<BuildingData>,
    /// Credit actions.
    pub actions: Vec<ActionData>,
    /// Curated starting specialists.
    pub starters: Vec<StarterData>,
}

/// Runtime structures built from a validated catalog.
#[derive(Debug, Clone)]
pub struct CatalogParts {
    /// Technology tree.
    pub technologies: UnlockGraph,
    /// Research projects.
    pub research: UnlockGraph,
    /// Blueprints with no instances.
    pub buildings: Buildings,
    /// Credit actions, all inactive.
    pub actions: ActionBook,
    /// Starting specialists.
    pub starters: Vec<Specialist>,
}

impl Catalog {
    /// Parse a catalog from RON. `source_name` labels parse errors.
    pub fn from_ron_str(source: &str, source_name: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| EconomyError::DataParse {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })
    }

    /// The embedded content of the original game.
    pub fn builtin() -> Result<Self> {
        Self::from_ron_str(BUILTIN_CATALOG, "builtin catalog")
    }

    /// Find a technology by its ID.
    #[must_use]
    pub fn get_technology(&self, id: &str) -> Option<&TechData> {
        self.technologies.iter().find(|t| t.id == id)
    }

    /// Find a research project by its ID.
    #[must_use]
    pub fn get_research(&self, id: &str) -> Option<&ResearchData> {
        self.research.iter().find(|r| r.id == id)
    }

    /// Find a building by its ID.
    #[must_use]
    pub fn get_building(&self, id: &str) -> Option<&BuildingData> {
        self.buildings.iter().find(|b| b.id == id)
    }

    /// Get all technologies at a specific tier.
    pub fn technologies_at_tier(&self, tier: u8) -> impl Iterator<Item = &TechData> {
        self.technologies.iter().filter(move |t| t.tier == tier)
    }

    /// Validate internal consistency.
    ///
    /// Checks for:
    /// - Malformed amounts, durations and multipliers
    /// - Duplicate ids
    /// - Unknown or cyclic prerequisites
    /// - Effects naming unknown buildings
    /// - Locked buildings nothing unlocks
    ///
    /// Returns a list of validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        self.assemble(&mut errors);
        errors
    }

    /// Validate and build the runtime structures.
    pub fn build(&self) -> Result<CatalogParts> {
        let mut errors = Vec::new();
        let parts = self.assemble(&mut errors);
        if errors.is_empty() {
            Ok(parts)
        } else {
            Err(EconomyError::InvalidCatalog(errors.join("; ")))
        }
    }

    fn assemble(&self, errors: &mut Vec<String>) -> CatalogParts {
        let mut technologies = UnlockGraph::new();
        for tech in &self.technologies {
            collect(errors, tech.to_node().and_then(|n| technologies.insert(n)));
        }

        let mut research = UnlockGraph::new();
        for project in &self.research {
            if technologies.get(&project.id).is_some() {
                errors.push(format!(
                    "Research '{}' shares an id with a technology",
                    project.id
                ));
                continue;
            }
            collect(errors, project.to_node().and_then(|n| research.insert(n)));
        }

        collect(errors, technologies.resolution_order(None).map(|_| ()));
        collect(errors, research.resolution_order(Some(&technologies)).map(|_| ()));

        let mut buildings = Buildings::new();
        for building in &self.buildings {
            let blueprint = building.to_blueprint().map(|mut blueprint| {
                blueprint.unlocked_by = self.unlocked_by(&building.id);
                blueprint
            });
            collect(errors, blueprint.and_then(|b| buildings.insert_blueprint(b)));
        }

        for (owner, effects) in self
            .technologies
            .iter()
            .map(|t| (&t.id, &t.effects))
            .chain(self.research.iter().map(|r| (&r.id, &r.effects)))
        {
            for target in effects.iter().filter_map(|e| e.unlocked_building()) {
                if self.get_building(target).is_none() {
                    errors.push(format!("'{owner}' unlocks unknown building '{target}'"));
                }
            }
        }

        for blueprint in buildings.blueprints() {
            if !blueprint.unlocked && blueprint.unlocked_by.is_empty() {
                errors.push(format!(
                    "Building '{}' is locked and nothing unlocks it",
                    blueprint.id
                ));
            }
        }

        let mut actions = ActionBook::new();
        for action in &self.actions {
            collect(errors, action.to_action().and_then(|a| actions.insert(a)));
        }

        let mut starters: Vec<Specialist> = Vec::new();
        for starter in &self.starters {
            if starters.iter().any(|s| s.id.as_str() == starter.id) {
                errors.push(format!("Duplicate starter id '{}'", starter.id));
                continue;
            }
            match starter.to_specialist() {
                Ok(specialist) => starters.push(specialist),
                Err(err) => errors.push(err.to_string()),
            }
        }

        CatalogParts {
            technologies,
            research,
            buildings,
            actions,
            starters,
        }
    }

    /// Technologies and projects whose effects unlock `building`.
    fn unlocked_by(&self, building: &str) -> Vec<NodeId> {
        self.technologies
            .iter()
            .map(|t| (&t.id, &t.effects))
            .chain(self.research.iter().map(|r| (&r.id, &r.effects)))
            .filter(|(_, effects)| {
                effects
                    .iter()
                    .any(|e| e.unlocked_building() == Some(building))
            })
            .map(|(id, _)| NodeId(id.clone()))
            .collect()
    }
}

fn collect(errors: &mut Vec<String>, result: Result<()>) {
    if let Err(err) = result {
        errors.push(err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceKind;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.validate(), Vec::<String>::new());

        assert_eq!(catalog.technologies.len(), 11);
        assert_eq!(catalog.research.len(), 2);
        assert_eq!(catalog.buildings.len(), 10);
        assert_eq!(catalog.actions.len(), 5);
        assert_eq!(catalog.starters.len(), 4);
        assert_eq!(catalog.technologies_at_tier(1).count(), 5);
    }

    #[test]
    fn test_builtin_parts() {
        let parts = Catalog::builtin().unwrap().build().unwrap();

        let solar = parts.buildings.blueprint("basicSolarArray").unwrap();
        assert_eq!(solar.unlocked_by, vec![NodeId::from("basicEnergySystems")]);
        assert!(!solar.unlocked);

        let specialties: Vec<_> = parts.starters.iter().map(|s| s.specialization).collect();
        for kind in ResourceKind::ALL {
            assert!(specialties.contains(&Some(kind)));
        }
    }

    #[test]
    fn test_unknown_building_effect_reported() {
        let catalog = Catalog::from_ron_str(
            r#"Catalog(
                technologies: [
                    TechData(
                        id: "t",
                        name: "T",
                        cost: (research_data: 1.0),
                        effects: [UnlockBuilding(building: "ghost")],
                    ),
                ],
            )"#,
            "test",
        )
        .unwrap();

        let errors = catalog.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("ghost"));
        assert!(matches!(
            catalog.build(),
            Err(EconomyError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn test_cycle_reported() {
        let catalog = Catalog::from_ron_str(
            r#"Catalog(
                technologies: [
                    TechData(id: "a", name: "A", cost: (research_data: 1.0), prerequisites: ["b"]),
                    TechData(id: "b", name: "B", cost: (research_data: 1.0), prerequisites: ["a"]),
                ],
            )"#,
            "test",
        )
        .unwrap();

        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("cycle")));
    }

    #[test]
    fn test_unreachable_building_reported() {
        let catalog = Catalog::from_ron_str(
            r#"Catalog(
                buildings: [
                    BuildingData(id: "orphan", name: "Orphan", cost: (material: 1.0)),
                ],
            )"#,
            "test",
        )
        .unwrap();

        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("orphan")));
    }

    #[test]
    fn test_parse_error_names_source() {
        let err = Catalog::from_ron_str("Catalog(technologies: 5)", "broken.ron").unwrap_err();
        match err {
            EconomyError::DataParse { source_name, .. } => assert_eq!(source_name, "broken.ron"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
