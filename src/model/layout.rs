use std::collections::BTreeMap;

/// Fold subdivision of each competition scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioLayout {
    folds: BTreeMap<String, Option<u32>>,
}

impl ScenarioLayout {
    pub fn empty() -> Self {
        Self {
            folds: BTreeMap::new(),
        }
    }

    pub fn epic() -> Self {
        Self::empty()
            .with_scenario("scenario_1", None)
            .with_scenario("scenario_2", Some(5))
            .with_scenario("scenario_3", Some(4))
            .with_scenario("scenario_4", Some(2))
    }

    pub fn with_scenario(mut self, scenario: &str, folds: Option<u32>) -> Self {
        self.folds.insert(scenario.to_string(), folds);
        self
    }

    pub fn is_known(&self, scenario: &str) -> bool {
        self.folds.contains_key(scenario)
    }

    /// Unknown scenarios are treated as folded.
    pub fn has_folds(&self, scenario: &str) -> bool {
        match self.folds.get(scenario) {
            Some(folds) => folds.is_some(),
            None => true,
        }
    }

    pub fn expected_folds(&self, scenario: &str) -> Option<u32> {
        self.folds.get(scenario).copied().flatten()
    }
}

impl Default for ScenarioLayout {
    fn default() -> Self {
        Self::epic()
    }
}
