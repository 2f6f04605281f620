use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::DepartmentLabel;

/// Static department → recipient lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTable {
    entries: BTreeMap<DepartmentLabel, String>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// One `<department>@<domain>` mailbox per department.
    pub fn with_domain(domain: &str) -> Self {
        DepartmentLabel::ALL
            .into_iter()
            .map(|label| (label, format!("{}@{}", label.key(), domain)))
            .collect()
    }

    pub fn with_route(mut self, label: DepartmentLabel, recipient: impl Into<String>) -> Self {
        self.insert(label, recipient);
        self
    }

    /// Sets the recipient for `label`, returning the one it replaced.
    pub fn insert(&mut self, label: DepartmentLabel, recipient: impl Into<String>) -> Option<String> {
        self.entries.insert(label, recipient.into())
    }

    pub fn resolve(&self, label: DepartmentLabel) -> Option<&str> {
        self.entries.get(&label).map(String::as_str)
    }

    pub fn labels(&self) -> impl Iterator<Item = DepartmentLabel> + '_ {
        self.entries.keys().copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = (DepartmentLabel, &str)> + '_ {
        self.entries
            .iter()
            .map(|(label, recipient)| (*label, recipient.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(DepartmentLabel, String)> for RoutingTable {
    fn from_iter<I: IntoIterator<Item = (DepartmentLabel, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_table_routes_every_department() {
        let table = RoutingTable::with_domain("university.example");
        assert_eq!(table.len(), DepartmentLabel::ALL.len());
        assert_eq!(
            table.resolve(DepartmentLabel::Scholarship),
            Some("scholarship@university.example")
        );
    }

    #[test]
    fn later_routes_replace_earlier_ones() {
        let mut table = RoutingTable::new().with_route(DepartmentLabel::Hostel, "warden@uni.example");
        let previous = table.insert(DepartmentLabel::Hostel, "hostel-office@uni.example");
        assert_eq!(previous.as_deref(), Some("warden@uni.example"));
        assert_eq!(
            table.resolve(DepartmentLabel::Hostel),
            Some("hostel-office@uni.example")
        );
        assert_eq!(table.resolve(DepartmentLabel::Accounts), None);
    }

    #[test]
    fn labels_iterate_in_declaration_order() {
        let table = RoutingTable::new()
            .with_route(DepartmentLabel::Hostel, "h@uni.example")
            .with_route(DepartmentLabel::Academic, "a@uni.example");
        assert_eq!(
            table.labels().collect::<Vec<_>>(),
            vec![DepartmentLabel::Academic, DepartmentLabel::Hostel]
        );
    }
}
