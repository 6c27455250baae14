use clap::{Args, Subcommand};
use dispatch_app::domain::users::{
    PgUsersService, UsersService,
    data::{NewAddress, NewUser},
    records::{AddressUuid, Role, UserUuid},
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Debug, Subcommand)]
enum UserSubcommand {
    /// Create a customer, staff or driver account
    Create(CreateUserArgs),

    /// Add a delivery address to a user
    AddAddress(AddAddressArgs),
}

#[derive(Debug, Args)]
struct CreateUserArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    phone: Option<String>,

    /// One of user, admin, super_admin, driver
    #[arg(long, default_value = "user")]
    role: Role,
}

#[derive(Debug, Args)]
struct AddAddressArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[arg(long)]
    user_uuid: Uuid,

    #[arg(long)]
    label: Option<String>,

    #[arg(long)]
    line1: String,

    #[arg(long)]
    line2: Option<String>,

    #[arg(long)]
    city: String,

    #[arg(long)]
    postal_code: String,

    #[arg(long)]
    country: String,
}

pub(crate) async fn run(command: UserCommand) -> Result<(), String> {
    match command.command {
        UserSubcommand::Create(args) => create(args).await,
        UserSubcommand::AddAddress(args) => add_address(args).await,
    }
}

async fn create(args: CreateUserArgs) -> Result<(), String> {
    let service = PgUsersService::new(super::connect(&args.database_url).await?);

    let user = service
        .create_user(NewUser {
            uuid: UserUuid::new(),
            name: args.name,
            email: args.email,
            phone: args.phone,
            role: args.role,
        })
        .await
        .map_err(|error| format!("failed to create user: {error}"))?;

    println!("user_uuid: {}", user.uuid);
    println!("user_role: {}", user.role);

    Ok(())
}

async fn add_address(args: AddAddressArgs) -> Result<(), String> {
    let service = PgUsersService::new(super::connect(&args.database_url).await?);

    let address = service
        .add_address(
            UserUuid::from_uuid(args.user_uuid),
            NewAddress {
                uuid: AddressUuid::new(),
                label: args.label,
                line1: args.line1,
                line2: args.line2,
                city: args.city,
                postal_code: args.postal_code,
                country: args.country,
            },
        )
        .await
        .map_err(|error| format!("failed to add address: {error}"))?;

    println!("address_uuid: {}", address.uuid);

    Ok(())
}
