use super::*;
use crate::KindId;
use crate::error::Refusal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_postgres::Client;

/// Process-wide immutable catalog of unit kinds and field presets.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    kinds: BTreeMap<KindId, UnitKind>,
    fields: BTreeMap<String, FieldPreset>,
}

impl Catalog {
    pub fn new<K, F>(kinds: K, fields: F) -> Self
    where
        K: IntoIterator<Item = UnitKind>,
        F: IntoIterator<Item = FieldPreset>,
    {
        Self {
            kinds: kinds.into_iter().map(|k| (k.id, k)).collect(),
            fields: fields.into_iter().map(|f| (f.name.clone(), f)).collect(),
        }
    }

    /// Loads the full catalog from the database.
    pub async fn hydrate(client: Arc<Client>) -> anyhow::Result<Self> {
        use const_format::concatcp;
        const KINDS: &str = concatcp!(
            "SELECT id, name, damage, defense, max_hp, speed, attack_range, ",
            "initiative, is_flying, is_kamikaze, dodge_chance, crit_chance, ",
            "luck, counter_chance, effective_against, stack_size ",
            "FROM ",
            crate::database::UNITS
        );
        const FIELDS: &str = concatcp!(
            "SELECT name, width, height ",
            "FROM ",
            crate::database::FIELDS
        );
        let kinds = client
            .query(KINDS, &[])
            .await?
            .into_iter()
            .map(UnitKind::from);
        let fields = client
            .query(FIELDS, &[])
            .await?
            .into_iter()
            .map(FieldPreset::from);
        let catalog = Self::new(kinds, fields);
        log::info!(
            "hydrated catalog: {} unit kinds, {} field presets",
            catalog.kinds.len(),
            catalog.fields.len()
        );
        Ok(catalog)
    }

    pub fn kind(&self, id: KindId) -> Result<&UnitKind, Refusal> {
        self.kinds
            .get(&id)
            .ok_or_else(|| Refusal::NotFound(format!("unknown unit kind {}", id)))
    }
    pub fn field(&self, name: &str) -> Result<&FieldPreset, Refusal> {
        self.fields
            .get(name)
            .ok_or_else(|| Refusal::NotFound(format!("unknown field preset {}", name)))
    }
    /// All kinds in ascending id order.
    pub fn roster(&self) -> impl Iterator<Item = &UnitKind> {
        self.kinds.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(id: KindId) -> UnitKind {
        UnitKind {
            id,
            name: format!("kind-{}", id),
            damage: 1,
            defense: 0,
            max_hp: 1,
            speed: 1,
            attack_range: 1,
            initiative: 1,
            is_flying: false,
            is_kamikaze: false,
            dodge_chance: 0.0,
            crit_chance: 0.0,
            luck: 0.0,
            counter_chance: 0.0,
            effective_against: None,
            stack_size: 1,
        }
    }

    #[test]
    fn lookups() {
        let catalog = Catalog::new(
            vec![kind(1), kind(2)],
            vec![FieldPreset {
                name: "5x5".to_string(),
                width: 5,
                height: 5,
            }],
        );
        assert_eq!(catalog.kind(1).unwrap().id, 1);
        assert!(catalog.kind(9).is_err());
        assert_eq!(catalog.field("5x5").unwrap().width, 5);
        assert!(catalog.field("9x9").is_err());
        assert_eq!(catalog.roster().count(), 2);
    }
}
