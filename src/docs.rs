use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use sekolah_core::{FieldError, PaginationMeta, PaginationParams};
use sekolah_models::academic_years::{
    AcademicYearFilterParams, AcademicYearResponse, CreateAcademicYearDto, CreateSemesterDto,
    PaginatedAcademicYearsResponse, SemesterResponse, SemesterType,
};
use sekolah_models::accounts::{Account, Gender, Role};
use sekolah_models::auth::{
    AdminProfile, LoginRequest, LoginResponse, MessageResponse, ParentProfile, RegisterAdminDto,
    RegisterParentDto, RegisterResponse, RegisterStudentDto, RegisterTeacherDto, SessionResponse,
    UserProfile,
};
use sekolah_models::classes::{
    ClassCounts, ClassFilterParams, ClassResponse, CreateClassDto, PaginatedClassesResponse,
    RosterEntry, UpdateClassDto,
};
use sekolah_models::majors::{
    CreateMajorDto, MajorCounts, MajorFilterParams, MajorResponse, PaginatedMajorsResponse,
    UpdateMajorDto,
};
use sekolah_models::students::{
    PaginatedStudentsResponse, StudentFilterParams, StudentResponse, UpdateStudentDto,
};
use sekolah_models::subjects::{
    CreateSubjectDto, PaginatedSubjectsResponse, SubjectCounts, SubjectFilterParams,
    SubjectResponse, UpdateSubjectDto,
};
use sekolah_models::summaries::{
    AcademicYearSummary, ClassSummary, MajorSummary, ParentSummary, TeacherSummary, UserSummary,
};
use sekolah_models::teachers::{
    PaginatedTeachersResponse, TeacherCounts, TeacherFilterParams, TeacherResponse,
    UpdateTeacherDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register_student,
        crate::modules::auth::controller::register_teacher,
        crate::modules::auth::controller::register_parent,
        crate::modules::auth::controller::register_admin,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::get_session,
        crate::modules::auth::controller::get_me,
        crate::modules::academic_years::controller::get_academic_years,
        crate::modules::academic_years::controller::get_academic_year,
        crate::modules::academic_years::controller::create_academic_year,
        crate::modules::academic_years::controller::activate_academic_year,
        crate::modules::academic_years::controller::delete_academic_year,
        crate::modules::academic_years::controller::create_semester,
        crate::modules::majors::controller::get_majors,
        crate::modules::majors::controller::get_major,
        crate::modules::majors::controller::create_major,
        crate::modules::majors::controller::update_major,
        crate::modules::majors::controller::delete_major,
        crate::modules::subjects::controller::get_subjects,
        crate::modules::subjects::controller::get_subject,
        crate::modules::subjects::controller::create_subject,
        crate::modules::subjects::controller::update_subject,
        crate::modules::subjects::controller::delete_subject,
        crate::modules::classes::controller::get_classes,
        crate::modules::classes::controller::get_class,
        crate::modules::classes::controller::get_class_students,
        crate::modules::classes::controller::create_class,
        crate::modules::classes::controller::update_class,
        crate::modules::classes::controller::delete_class,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_my_student_profile,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::deactivate_student,
        crate::modules::teachers::controller::get_teachers,
        crate::modules::teachers::controller::get_my_teacher_profile,
        crate::modules::teachers::controller::get_teacher,
        crate::modules::teachers::controller::update_teacher,
        crate::modules::teachers::controller::deactivate_teacher,
    ),
    components(
        schemas(
            Account,
            Role,
            Gender,
            RegisterStudentDto,
            RegisterTeacherDto,
            RegisterParentDto,
            RegisterAdminDto,
            RegisterResponse,
            LoginRequest,
            LoginResponse,
            SessionResponse,
            MessageResponse,
            UserProfile,
            ParentProfile,
            AdminProfile,
            AcademicYearResponse,
            SemesterResponse,
            SemesterType,
            CreateAcademicYearDto,
            CreateSemesterDto,
            AcademicYearFilterParams,
            PaginatedAcademicYearsResponse,
            MajorResponse,
            MajorCounts,
            CreateMajorDto,
            UpdateMajorDto,
            MajorFilterParams,
            PaginatedMajorsResponse,
            SubjectResponse,
            SubjectCounts,
            CreateSubjectDto,
            UpdateSubjectDto,
            SubjectFilterParams,
            PaginatedSubjectsResponse,
            ClassResponse,
            ClassCounts,
            CreateClassDto,
            UpdateClassDto,
            ClassFilterParams,
            PaginatedClassesResponse,
            RosterEntry,
            StudentResponse,
            UpdateStudentDto,
            StudentFilterParams,
            PaginatedStudentsResponse,
            TeacherResponse,
            TeacherCounts,
            UpdateTeacherDto,
            TeacherFilterParams,
            PaginatedTeachersResponse,
            AcademicYearSummary,
            MajorSummary,
            ClassSummary,
            TeacherSummary,
            ParentSummary,
            UserSummary,
            FieldError,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and sessions"),
        (name = "Academic Years", description = "Academic years and semesters"),
        (name = "Majors", description = "Vocational majors"),
        (name = "Subjects", description = "Subjects taught per major or school-wide"),
        (name = "Classes", description = "Classes and class rosters"),
        (name = "Students", description = "Student profiles"),
        (name = "Teachers", description = "Teacher profiles")
    ),
    info(
        title = "Sekolah API",
        version = "0.1.0",
        description = "School administration REST API built with Rust, Axum, and PostgreSQL using opaque session tokens.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some("Session token returned by POST /api/auth/login"))
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_module() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/academic-years/{id}/semesters",
            "/api/majors/{id}",
            "/api/subjects",
            "/api/classes/{id}/students",
            "/api/students/me",
            "/api/teachers/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
