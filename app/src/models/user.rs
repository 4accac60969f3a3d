// app/src/models/user.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Admin,
}

text_enum!(Role, "role", {
  User => "user",
  Admin => "admin",
});

/// Account record. Accounts are created elsewhere; this service only reads
/// them for recipients, ownership and admin checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id: Uuid,
  pub name: String,
  pub email: String,
  pub role: Role,
}

impl User {
  pub fn new(name: &str, email: &str, role: Role) -> Self {
    Self {
      id: Uuid::new_v4(),
      name: name.to_string(),
      email: email.to_string(),
      role,
    }
  }

  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }
}
