//! User entity <-> model mapper

use carpool_core::entities::{User, UserKind};
use carpool_core::value_objects::Snowflake;

use crate::models::UserModel;

/// Convert UserModel to User entity
impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        let kind = match model.user_type.as_str() {
            "academician" => UserKind::Academician {
                title: model.title.unwrap_or_default(),
                department: model.department.unwrap_or_default(),
            },
            _ => UserKind::Student {
                student_number: model.student_number.unwrap_or_default(),
            },
        };

        User {
            id: Snowflake::new(model.id),
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            phone_number: model.phone_number,
            kind,
            reputation: model.reputation,
            profile_photo: model.profile_photo,
            is_online: model.is_online,
            last_active_at: model.last_active_at,
            created_at: model.created_at,
        }
    }
}

/// Column values for inserting a user; the kind is flattened into nullable columns
pub struct UserInsert<'a> {
    pub user_type: &'static str,
    pub student_number: Option<&'a str>,
    pub title: Option<&'a str>,
    pub department: Option<&'a str>,
}

impl<'a> UserInsert<'a> {
    pub fn new(user: &'a User) -> Self {
        match &user.kind {
            UserKind::Student { student_number } => Self {
                user_type: user.kind.as_str(),
                student_number: Some(student_number),
                title: None,
                department: None,
            },
            UserKind::Academician { title, department } => Self {
                user_type: user.kind.as_str(),
                student_number: None,
                title: Some(title),
                department: Some(department),
            },
        }
    }
}
