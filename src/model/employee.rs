use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lenient;

/// A member of the site workforce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(default = "Uuid::new_v4", deserialize_with = "lenient::id")]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    /// Name of the team this person belongs to.
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub role: String,
}

impl Employee {
    pub fn new(name: &str, team: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            team: team.into(),
            role: role.into(),
        }
    }
}

/// On-disk shape of the people document: `{ "employees": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct People {
    #[serde(default)]
    pub employees: Vec<Employee>,
}

impl People {
    /// Case-insensitive, whitespace-insensitive name lookup.
    ///
    /// `except` skips one record so an employee can keep its own name on edit.
    pub fn name_taken(&self, name: &str, except: Option<Uuid>) -> bool {
        let wanted = name.trim().to_lowercase();
        self.employees
            .iter()
            .filter(|e| Some(e.id) != except)
            .any(|e| e.name.trim().to_lowercase() == wanted)
    }

    pub fn get(&self, id: Uuid) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Employee> {
        self.employees.iter_mut().find(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_taken_ignores_case_and_surrounding_whitespace() {
        let people = People {
            employees: vec![Employee::new("  Maria Souza ", "Masonry", "Mason")],
        };
        assert_eq!(people.employees[0].name, "Maria Souza");
        assert!(people.name_taken("maria souza", None));
        assert!(people.name_taken(" MARIA SOUZA", None));
        assert!(!people.name_taken("Mario Souza", None));
    }

    #[test]
    fn name_taken_can_exclude_the_record_being_edited() {
        let people = People {
            employees: vec![Employee::new("Ana", "Electrical", "Electrician")],
        };
        let id = people.employees[0].id;
        assert!(!people.name_taken("ana", Some(id)));
    }

    #[test]
    fn people_document_defaults_to_empty_list() {
        let people: People = serde_json::from_str("{}").unwrap();
        assert!(people.employees.is_empty());
    }

    #[test]
    fn hand_edited_ids_are_replaced_not_fatal() {
        let json = r#"{"employees": [
            {"id": "emp-1", "name": "Rita", "team": "Alpha", "role": "Foreman"},
            {"name": "Caio", "team": "Alpha"}
        ]}"#;
        let people: People = serde_json::from_str(json).unwrap();
        assert_eq!(people.employees.len(), 2);
        assert!(!people.employees[0].id.is_nil());
        assert_ne!(people.employees[0].id, people.employees[1].id);
        assert_eq!(people.employees[1].role, "");
    }
}
