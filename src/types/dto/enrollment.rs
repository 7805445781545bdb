use poem_openapi::Object;

use crate::types::db::enrollment;
use crate::types::internal::enrollment::GroupOccupancy;

/// Request to enroll a student in a unit for a semester
#[derive(Object, Debug)]
#[oai(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub student_code: String,
    pub unit_id: i32,
    pub semester_id: i32,
}

/// A recorded enrollment
#[derive(Object, Debug, Clone)]
#[oai(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    pub id: i32,
    pub student_code: String,
    pub unit_id: i32,
    pub semester_id: i32,
    /// Group label, e.g. `A`
    pub group: String,
}

impl From<enrollment::Model> for EnrollmentResponse {
    fn from(model: enrollment::Model) -> Self {
        Self {
            id: model.id,
            student_code: model.student_code,
            unit_id: model.unit_id,
            semester_id: model.semester_id,
            group: model.group_label,
        }
    }
}

/// Seats taken in one group of a unit
#[derive(Object, Debug)]
#[oai(rename_all = "camelCase")]
pub struct GroupOccupancyResponse {
    pub group: String,
    pub enrolled: u64,
    pub capacity: u32,
    pub full: bool,
}

impl From<GroupOccupancy> for GroupOccupancyResponse {
    fn from(occupancy: GroupOccupancy) -> Self {
        Self {
            full: occupancy.is_full(),
            group: occupancy.group,
            enrolled: occupancy.enrolled,
            capacity: occupancy.capacity,
        }
    }
}
