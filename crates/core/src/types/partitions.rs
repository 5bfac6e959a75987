use crate::error::Result;
use crate::model::{TypeData, TypeId};
use crate::snapshot::DataTables;
use serde::{Deserialize, Serialize};

/// Type ids grouped by variant. Name lookup searches only the groups a
/// name can belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partitions {
    pub wildcards: Vec<TypeId>,
    pub parameterized: Vec<TypeId>,
    pub type_variables: Vec<TypeId>,
    pub raw: Vec<TypeId>,
}

impl Partitions {
    pub fn build(tables: &DataTables) -> Result<Self> {
        let mut partitions = Partitions::default();
        for id in tables.type_ids() {
            match tables.type_data(id)? {
                TypeData::Wildcard(_) => partitions.wildcards.push(id),
                TypeData::Parameterized(_) => partitions.parameterized.push(id),
                TypeData::TypeVariable(_) => partitions.type_variables.push(id),
                TypeData::Raw(_) => partitions.raw.push(id),
            }
        }
        Ok(partitions)
    }

    pub fn len(&self) -> usize {
        self.wildcards.len() + self.parameterized.len() + self.type_variables.len() + self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_type_lands_in_one_group() {
        let tables = DataTables::new(
            serde_json::from_value(json!({
                "types": [{"n": 0}, {"r": 0}, {"tv": 1}, {}, {"n": 1}],
                "names": ["A", "T"]
            }))
            .unwrap(),
        );
        let partitions = Partitions::build(&tables).unwrap();
        assert_eq!(partitions.raw, vec![0, 4]);
        assert_eq!(partitions.parameterized, vec![1]);
        assert_eq!(partitions.type_variables, vec![2]);
        assert_eq!(partitions.wildcards, vec![3]);
        assert_eq!(partitions.len(), tables.type_count());
    }
}
