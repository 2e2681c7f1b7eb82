/// Directed parent → child link.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Connection {
    pub id: String,
    pub from_id: String,
    pub to_id: String,
}

impl Connection {
    /// Connection whose id is derived from its endpoints
    pub fn between(parent_id: &str, child_id: &str) -> Self {
        Self {
            id: Self::id_for(parent_id, child_id),
            from_id: parent_id.to_string(),
            to_id: child_id.to_string(),
        }
    }

    /// `<parent byte length>:<parent>-<child>`. The length prefix keeps ids
    /// distinct when node ids themselves contain `-`.
    pub fn id_for(parent_id: &str, child_id: &str) -> String {
        format!("{}:{parent_id}-{child_id}", parent_id.len())
    }

    pub fn touches(&self, id: &str) -> bool {
        self.from_id == id || self.to_id == id
    }
}
