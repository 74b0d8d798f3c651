pub mod join;

use std::sync::Arc;

use crate::errors::Result;
use crate::models::classes::entities::Class;
use crate::models::users::entities::User;
use crate::storage::Storage;

#[derive(Clone)]
pub struct ClassService {
    storage: Arc<dyn Storage>,
}

impl ClassService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub(crate) fn get_storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub async fn join_by_code(&self, student: &User, enrollment_code: &str) -> Result<Class> {
        join::join_by_code(self, student, enrollment_code).await
    }
}
