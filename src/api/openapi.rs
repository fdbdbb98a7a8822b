//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    appointment_handler, auth_handler, health_handler, notification_handler, pet_handler,
    subscription_handler, user_handler,
};
use crate::domain::{
    AppointmentResponse, AppointmentStatus, ChangePassword, CreateAppointment, CreateHealthRecord,
    CreateNotification, CreatePet, CreatePlan, CreateSubscription, CreateVaccination, Gender,
    HealthRecordResponse, NotificationResponse, NotificationType, PetResponse, PetType, PlanResponse,
    PlanType, ProfileResponse, RegisterUser, SubscriptionResponse, SubscriptionStatus,
    UpdateAppointment, UpdateHealthRecord, UpdateNotification, UpdatePet, UpdatePlan,
    UpdateProfile, UpdateSubscription, UpdateUser, UpdateVaccination, UserResponse, UserRole,
    VaccinationResponse, VaccinationStatus,
};
use crate::services::{AccessToken, AuthPayload, TokenPair};
use crate::types::PaginationMeta;

/// OpenAPI documentation for the Pet Health API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pet Health API",
        version = "0.1.0",
        description = "Pet health records, vaccinations, appointments and subscriptions"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        auth_handler::refresh,
        auth_handler::verify,
        // User endpoints
        user_handler::list_users,
        user_handler::get_me,
        user_handler::update_me,
        user_handler::delete_me,
        user_handler::change_password,
        user_handler::get_user,
        user_handler::update_user,
        user_handler::delete_user,
        user_handler::get_my_profile,
        user_handler::update_my_profile,
        user_handler::get_profile,
        user_handler::update_profile,
        // Pet endpoints
        pet_handler::list_pets,
        pet_handler::my_pets,
        pet_handler::deleted_pets,
        pet_handler::create_pet,
        pet_handler::get_pet,
        pet_handler::replace_pet,
        pet_handler::update_pet,
        pet_handler::delete_pet,
        pet_handler::restore_pet,
        // Health endpoints
        health_handler::list_vaccinations,
        health_handler::my_pets_vaccinations,
        health_handler::pending_vaccinations,
        health_handler::overdue_vaccinations,
        health_handler::create_vaccination,
        health_handler::get_vaccination,
        health_handler::replace_vaccination,
        health_handler::update_vaccination,
        health_handler::delete_vaccination,
        health_handler::list_health_records,
        health_handler::my_pets_records,
        health_handler::pet_records,
        health_handler::create_health_record,
        health_handler::get_health_record,
        health_handler::replace_health_record,
        health_handler::update_health_record,
        health_handler::delete_health_record,
        // Appointment endpoints
        appointment_handler::list_appointments,
        appointment_handler::create_appointment,
        appointment_handler::get_appointment,
        appointment_handler::replace_appointment,
        appointment_handler::update_appointment,
        appointment_handler::delete_appointment,
        // Notification endpoints
        notification_handler::list_notifications,
        notification_handler::my_notifications,
        notification_handler::unread_notifications,
        notification_handler::create_notification,
        notification_handler::get_notification,
        notification_handler::replace_notification,
        notification_handler::update_notification,
        notification_handler::delete_notification,
        notification_handler::mark_read,
        // Subscription endpoints
        subscription_handler::list_plans,
        subscription_handler::active_plans,
        subscription_handler::create_plan,
        subscription_handler::get_plan,
        subscription_handler::replace_plan,
        subscription_handler::update_plan,
        subscription_handler::delete_plan,
        subscription_handler::list_subscriptions,
        subscription_handler::my_subscriptions,
        subscription_handler::my_subscription,
        subscription_handler::current_subscription,
        subscription_handler::create_subscription,
        subscription_handler::get_subscription,
        subscription_handler::replace_subscription,
        subscription_handler::update_subscription,
        subscription_handler::delete_subscription,
        subscription_handler::cancel_subscription,
    ),
    components(
        schemas(
            // Accounts
            UserRole,
            UserResponse,
            RegisterUser,
            UpdateUser,
            ChangePassword,
            ProfileResponse,
            UpdateProfile,
            // Auth types
            auth_handler::LoginRequest,
            auth_handler::RefreshRequest,
            auth_handler::VerifyRequest,
            auth_handler::VerifiedToken,
            AuthPayload,
            TokenPair,
            AccessToken,
            // Pets
            Gender,
            PetType,
            PetResponse,
            CreatePet,
            UpdatePet,
            // Health
            VaccinationStatus,
            VaccinationResponse,
            CreateVaccination,
            UpdateVaccination,
            HealthRecordResponse,
            CreateHealthRecord,
            UpdateHealthRecord,
            // Appointments
            AppointmentStatus,
            AppointmentResponse,
            CreateAppointment,
            UpdateAppointment,
            // Notifications
            NotificationType,
            NotificationResponse,
            CreateNotification,
            UpdateNotification,
            // Subscriptions
            PlanType,
            PlanResponse,
            CreatePlan,
            UpdatePlan,
            SubscriptionStatus,
            SubscriptionResponse,
            CreateSubscription,
            UpdateSubscription,
            PaginationMeta,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and JWT tokens"),
        (name = "Users", description = "Account management"),
        (name = "Profiles", description = "Extended user profiles"),
        (name = "Pets", description = "Pets with soft delete and restore"),
        (name = "Vaccinations", description = "Vaccination schedule and status"),
        (name = "Health Records", description = "Checkups, treatments and other records"),
        (name = "Appointments", description = "Veterinary appointments"),
        (name = "Notifications", description = "In-app notifications"),
        (name = "Subscription Plans", description = "Plan catalog"),
        (name = "Subscriptions", description = "User subscriptions")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token obtained from /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_protected_and_public_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/auth/login"));
        assert!(paths.contains_key("/api/pets/{id}/restore"));
        assert!(paths.contains_key("/api/subscriptions/subscriptions/{id}/cancel"));
        assert!(doc
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("bearer_auth")));
    }
}
