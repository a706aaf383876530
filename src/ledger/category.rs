use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Groups transactions for budgeting and reporting.
///
/// Parent and child links are plain ids resolved through the owning
/// [`Account`](super::Account); nothing here prevents cycles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    pub parent_id: Option<Uuid>,
    pub is_income_category: bool,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub sub_category_ids: Vec<Uuid>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            icon: String::new(),
            color: String::new(),
            parent_id: None,
            is_income_category: false,
            sort_order: 0,
            sub_category_ids: Vec::new(),
        }
    }

    pub fn income(name: impl Into<String>) -> Self {
        let mut category = Self::new(name);
        category.is_income_category = true;
        category
    }

    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn has_sub_categories(&self) -> bool {
        !self.sub_category_ids.is_empty()
    }

    /// Appends a child id unless it is already present.
    pub fn add_sub_category(&mut self, category_id: Uuid) {
        if !self.sub_category_ids.contains(&category_id) {
            self.sub_category_ids.push(category_id);
        }
    }

    pub fn remove_sub_category(&mut self, category_id: Uuid) {
        self.sub_category_ids.retain(|id| *id != category_id);
    }

    /// Single level path using the raw parent id. See
    /// [`Account::category_path`](super::Account::category_path) for names.
    pub fn display_path(&self) -> String {
        match self.parent_id {
            Some(parent) => format!("{} > {}", parent, self.name),
            None => self.name.clone(),
        }
    }
}
