// Administrative commands: users, roles, tokens and catalog entries

use std::sync::Arc;

use crate::app_data::AppData;
use crate::cli::Commands;
use crate::coordinators::AdminCoordinator;
use crate::errors::InternalError;
use crate::stores::NewUser;
use crate::types::internal::context::RequestContext;

/// Run one administrative command inside a CLI audit session
pub async fn run(
    command: Commands,
    app_data: Arc<AppData>,
) -> Result<(), Box<dyn std::error::Error>> {
    let command_name = command.name();
    let ctx = RequestContext::for_cli(command_name);
    let audit_logger = Arc::clone(&app_data.audit_logger);

    if let Err(e) = audit_logger
        .log_cli_session_start(&ctx, command_name, session_args(&command))
        .await
    {
        eprintln!("Warning: Failed to log CLI session start: {}", e);
    }

    let coordinator = AdminCoordinator::new(app_data);
    let result = run_impl(&coordinator, &ctx, command).await;

    let error_message = result.as_ref().err().map(|e| e.to_string());
    if let Err(e) = audit_logger
        .log_cli_session_end(&ctx, command_name, result.is_ok(), error_message)
        .await
    {
        eprintln!("Warning: Failed to log CLI session end: {}", e);
    }

    Ok(result?)
}

/// Arguments worth recording; tokens are never part of them
fn session_args(command: &Commands) -> Vec<String> {
    match command {
        Commands::AddUser { code, roles, .. } | Commands::AssignRoles { code, roles } => {
            let mut args = vec![format!("code={}", code)];
            args.extend(roles.iter().map(|r| format!("role={}", r)));
            args
        }
        Commands::IssueToken { code } => vec![format!("code={}", code)],
        Commands::AddUnit { code, school, .. } => {
            vec![format!("code={}", code), format!("school={}", school)]
        }
        Commands::AddSemester { name } => vec![format!("name={}", name)],
        Commands::Serve | Commands::Migrate => Vec::new(),
    }
}

async fn run_impl(
    coordinator: &AdminCoordinator,
    ctx: &RequestContext,
    command: Commands,
) -> Result<(), InternalError> {
    match command {
        Commands::AddUser {
            code,
            first_name,
            last_name,
            email,
            schools,
            roles,
        } => {
            let user = coordinator
                .create_user(
                    ctx,
                    NewUser {
                        code,
                        first_name,
                        last_name,
                        email,
                        schools,
                        roles,
                    },
                )
                .await?;
            println!("Created user {} ({})", user.code, user.full_name());
            println!(
                "Home school: {}",
                user.home_school.as_deref().unwrap_or("none")
            );
        }
        Commands::AssignRoles { code, roles } => {
            let user = coordinator.assign_roles(ctx, &code, roles).await?;
            println!("Roles of {}: {}", user.code, user.role_names().join(", "));
            println!(
                "Home school: {}",
                user.home_school.as_deref().unwrap_or("none")
            );
        }
        Commands::IssueToken { code } => {
            let (token, jti) = coordinator.issue_token(ctx, &code).await?;
            eprintln!("Token {} issued for {}", jti, code);
            println!("{}", token);
        }
        Commands::AddUnit {
            code,
            name,
            school,
            group_capacity,
        } => {
            let unit = coordinator
                .create_unit(ctx, &code, &name, school, group_capacity)
                .await?;
            println!("Created unit {} ({}) with id {}", unit.code, unit.school, unit.id);
        }
        Commands::AddSemester { name } => {
            let semester = coordinator.create_semester(ctx, &name).await?;
            println!("Created semester {} with id {}", semester.name, semester.id);
        }
        Commands::Serve | Commands::Migrate => {
            tracing::warn!("{} is not an administrative command", command.name());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_app_data;

    #[tokio::test]
    async fn test_assign_roles_command_persists_home_school() {
        let app_data = setup_app_data().await;

        run(
            Commands::AddUser {
                code: "LEC010".to_string(),
                first_name: "Grace".to_string(),
                last_name: "Wanjiru".to_string(),
                email: "grace@example.ac.ke".to_string(),
                schools: Some("shs".to_string()),
                roles: vec!["Lecturer".to_string()],
            },
            app_data.clone(),
        )
        .await
        .unwrap();

        run(
            Commands::AssignRoles {
                code: "LEC010".to_string(),
                roles: vec!["Faculty Admin - SCES".to_string()],
            },
            app_data.clone(),
        )
        .await
        .unwrap();

        let user = app_data
            .stores
            .user_store
            .get_by_code(&app_data.connections.portal, "LEC010")
            .await
            .unwrap();
        assert_eq!(user.home_school.as_deref(), Some("SCES"));

        let sessions = app_data
            .stores
            .audit_store
            .events_of_type("cli_session_end")
            .await
            .unwrap();
        assert_eq!(sessions.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_command_is_recorded_as_unsuccessful() {
        let app_data = setup_app_data().await;

        let result = run(
            Commands::IssueToken {
                code: "NOBODY".to_string(),
            },
            app_data.clone(),
        )
        .await;
        assert!(result.is_err());

        let sessions = app_data
            .stores
            .audit_store
            .events_of_type("cli_session_end")
            .await
            .unwrap();
        assert_eq!(sessions.len(), 1);
        assert!(sessions[0].data.contains("\"success\":false"));
    }

    #[test]
    fn test_session_args_skip_serve() {
        assert!(session_args(&Commands::Serve).is_empty());
        assert_eq!(
            session_args(&Commands::IssueToken {
                code: "ADM001".to_string()
            }),
            vec!["code=ADM001".to_string()]
        );
    }
}
