//! Variable types: the letter that prefixes a grade variable and what it
//! stands for (`P` is a Prova, `T` a Trabalho).

use serde::{Deserialize, Serialize};

use super::analyzer::split_var;
use super::storage::{GradeError, Result};
use crate::storage::SettingsStore;

/// Settings key holding the user-defined variable types
pub const CUSTOM_VARS_KEY: &str = "customGradeVars";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableType {
    pub letter: char,
    pub name: String,
}

impl VariableType {
    pub fn new(letter: char, name: impl Into<String>) -> Self {
        Self {
            letter: letter.to_ascii_uppercase(),
            name: name.into(),
        }
    }
}

/// Types every installation starts with
pub fn builtin_types() -> Vec<VariableType> {
    vec![VariableType::new('P', "Prova"), VariableType::new('T', "Trabalho")]
}

/// Built-in plus custom variable types. Letters are unique across both.
#[derive(Debug, Clone, Default)]
pub struct VariableTypes {
    custom: Vec<VariableType>,
}

impl VariableTypes {
    pub fn new(custom: Vec<VariableType>) -> Self {
        Self { custom }
    }

    /// Load the custom table from settings
    pub fn load(settings: &SettingsStore) -> Result<Self> {
        let custom: Vec<VariableType> = settings.get_setting(CUSTOM_VARS_KEY)?.unwrap_or_default();
        Ok(Self::new(custom))
    }

    pub fn save(&self, settings: &SettingsStore) -> Result<()> {
        settings.save_setting(CUSTOM_VARS_KEY, &self.custom)?;
        Ok(())
    }

    pub fn custom(&self) -> &[VariableType] {
        &self.custom
    }

    pub fn all(&self) -> Vec<VariableType> {
        let mut all = builtin_types();
        all.extend(self.custom.iter().cloned());
        all
    }

    pub fn find(&self, letter: char) -> Option<VariableType> {
        let letter = letter.to_ascii_uppercase();
        self.all().into_iter().find(|v| v.letter == letter)
    }

    /// Register a custom type. The letter must be a single A-Z character
    /// (either case) not already in use.
    pub fn add(&mut self, letter: &str, name: &str) -> Result<VariableType> {
        let name = name.trim();
        let letter_str = letter.trim().to_ascii_uppercase();

        if name.is_empty() {
            return Err(GradeError::EmptyVariableName);
        }

        let mut chars = letter_str.chars();
        let letter = match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_uppercase() => c,
            _ => return Err(GradeError::InvalidVariableLetter(letter.to_string())),
        };

        if self.find(letter).is_some() {
            return Err(GradeError::DuplicateVariableLetter(letter));
        }

        let var_type = VariableType::new(letter, name);
        self.custom.push(var_type.clone());
        log::info!("Added variable type {} ({})", letter, name);
        Ok(var_type)
    }

    /// Remove a custom type. Built-in types cannot be removed.
    pub fn remove(&mut self, letter: char) -> bool {
        let letter = letter.to_ascii_uppercase();
        let before = self.custom.len();
        self.custom.retain(|v| v.letter != letter);
        self.custom.len() != before
    }

    /// Human-readable name of a variable: `P2` becomes `Prova 2`.
    /// Unknown letters fall back to the variable itself.
    pub fn full_name(&self, variable: &str) -> String {
        let (letters, digits) = split_var(variable);
        let mut letter_chars = letters.chars();
        let found = match (letter_chars.next(), letter_chars.next()) {
            (Some(c), None) => self.find(c),
            _ => None,
        };

        match found {
            Some(var_type) if digits.is_empty() => var_type.name,
            Some(var_type) => format!("{} {}", var_type.name, digits),
            None => variable.to_ascii_uppercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtins() {
        let types = VariableTypes::default();
        assert_eq!(types.all().len(), 2);
        assert_eq!(types.find('p').map(|v| v.name), Some("Prova".to_string()));
    }

    #[test]
    fn test_full_name() {
        let types = VariableTypes::default();
        assert_eq!(types.full_name("P2"), "Prova 2");
        assert_eq!(types.full_name("t10"), "Trabalho 10");
        assert_eq!(types.full_name("X1"), "X1");
        assert_eq!(types.full_name("PT1"), "PT1");
    }

    #[test]
    fn test_add_custom() {
        let mut types = VariableTypes::default();
        let added = types.add("s", " Seminário ").unwrap();
        assert_eq!(added, VariableType::new('S', "Seminário"));
        assert_eq!(types.full_name("S1"), "Seminário 1");
    }

    #[test]
    fn test_add_rejects_bad_input() {
        let mut types = VariableTypes::default();
        assert!(matches!(types.add("", "Quiz"), Err(GradeError::InvalidVariableLetter(_))));
        assert!(matches!(types.add("QZ", "Quiz"), Err(GradeError::InvalidVariableLetter(_))));
        assert!(matches!(types.add("1", "Quiz"), Err(GradeError::InvalidVariableLetter(_))));
        assert!(matches!(types.add("Q", "  "), Err(GradeError::EmptyVariableName)));
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let mut types = VariableTypes::default();
        assert!(matches!(types.add("p", "Projeto"), Err(GradeError::DuplicateVariableLetter('P'))));

        types.add("L", "Lista").unwrap();
        assert!(matches!(types.add("l", "Laboratório"), Err(GradeError::DuplicateVariableLetter('L'))));
    }

    #[test]
    fn test_remove_only_custom() {
        let mut types = VariableTypes::default();
        types.add("L", "Lista").unwrap();
        assert!(types.remove('l'));
        assert!(!types.remove('P'));
        assert!(types.find('P').is_some());
    }

    #[test]
    fn test_persisted_in_settings() {
        let temp_dir = TempDir::new().unwrap();
        let settings = SettingsStore::new(temp_dir.path().to_path_buf());

        let mut types = VariableTypes::load(&settings).unwrap();
        types.add("L", "Lista").unwrap();
        types.save(&settings).unwrap();

        let reloaded = VariableTypes::load(&settings).unwrap();
        assert_eq!(reloaded.custom(), &[VariableType::new('L', "Lista")]);
    }
}
