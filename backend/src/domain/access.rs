//! Who may see and change what.

use super::user::{User, UserId};

/// Authenticated caller as seen by the domain services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    user_id: UserId,
    is_staff: bool,
}

impl Principal {
    pub fn new(user_id: UserId, is_staff: bool) -> Self {
        Self { user_id, is_staff }
    }

    pub fn applicant(user_id: UserId) -> Self {
        Self::new(user_id, false)
    }

    pub fn staff(user_id: UserId) -> Self {
        Self::new(user_id, true)
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn is_staff(&self) -> bool {
        self.is_staff
    }

    /// Staff read everything; applicants read what they own.
    pub fn can_read(&self, owner: &UserId) -> bool {
        self.is_staff || self.owns(owner)
    }

    /// Status, comment and design image are staff-only.
    pub fn can_review(&self) -> bool {
        self.is_staff
    }

    pub fn can_manage_categories(&self) -> bool {
        self.is_staff
    }

    /// Only the applicant may withdraw their request.
    pub fn can_delete(&self, owner: &UserId) -> bool {
        self.owns(owner)
    }

    pub fn can_toggle_favorite(&self, owner: &UserId) -> bool {
        self.is_staff || self.owns(owner)
    }

    fn owns(&self, owner: &UserId) -> bool {
        &self.user_id == owner
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self::new(user.id().clone(), user.is_staff())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn staff_read_any_application() {
        let staff = Principal::staff(UserId::random());
        assert!(staff.can_read(&UserId::random()));
        assert!(staff.can_review());
        assert!(staff.can_manage_categories());
    }

    #[rstest]
    fn applicants_are_limited_to_their_own() {
        let owner = UserId::random();
        let applicant = Principal::applicant(owner.clone());
        assert!(applicant.can_read(&owner));
        assert!(!applicant.can_read(&UserId::random()));
        assert!(applicant.can_delete(&owner));
        assert!(!applicant.can_review());
        assert!(!applicant.can_manage_categories());
    }

    #[rstest]
    fn staff_cannot_delete_someone_elses_request() {
        let staff = Principal::staff(UserId::random());
        assert!(!staff.can_delete(&UserId::random()));
        assert!(staff.can_toggle_favorite(&UserId::random()));
    }
}
