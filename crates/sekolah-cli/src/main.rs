use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use sekolah_cli::accounts::{NewAdmin, create_admin};
use sekolah_cli::seeder::{self, SeedConfig};
use sekolah_cli::sessions::purge_expired_sessions;
use sekolah_config::DatabaseConfig;
use sekolah_db::{PgPool, init_db_pool};

#[derive(Parser)]
#[command(name = "sekolah-cli")]
#[command(about = "Sekolah CLI - Administrative tools for the Sekolah API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new administrator account
    CreateAdmin {
        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Full name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,

        /// Position, e.g. "Kepala Sekolah"
        #[arg(long)]
        position: Option<String>,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,
    },
    /// Seed the reference school: admin, academic year, majors, subjects and classes
    Seed {
        /// Number of fake students per seeded class
        #[arg(short = 's', long, default_value = "10")]
        students: usize,

        /// Password for the seeded admin and students
        #[arg(long, default_value = "password123")]
        password: String,
    },
    /// Seed fake students into the classes of the active academic year
    SeedStudents {
        /// Number of students per class
        #[arg(short = 's', long, default_value = "10")]
        students: usize,

        /// Password for the seeded students
        #[arg(long, default_value = "password123")]
        password: String,
    },
    /// Delete every seeded student account
    ClearStudents,
    /// Delete expired sessions
    PurgeSessions,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    let config = match DatabaseConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let pool = match init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::CreateAdmin {
            email,
            name,
            password,
            position,
            phone,
        } => handle_create_admin(&pool, email, name, password, position, phone).await,
        Commands::Seed { students, password } => handle_seed(&pool, students, password).await,
        Commands::SeedStudents { students, password } => {
            handle_seed_students(&pool, students, &password).await
        }
        Commands::ClearStudents => handle_clear_students(&pool).await,
        Commands::PurgeSessions => handle_purge_sessions(&pool).await,
    }
}

fn prompt(label: &str) -> String {
    Input::new()
        .with_prompt(label)
        .interact_text()
        .unwrap_or_else(|e| {
            eprintln!("❌ Failed to read {}: {}", label.to_lowercase(), e);
            std::process::exit(1);
        })
}

async fn handle_create_admin(
    pool: &PgPool,
    email: Option<String>,
    name: Option<String>,
    password: Option<String>,
    position: Option<String>,
    phone: Option<String>,
) {
    let email = email.unwrap_or_else(|| prompt("Email address"));
    let name = name.unwrap_or_else(|| prompt("Full name"));

    let password = password.unwrap_or_else(|| {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .unwrap_or_else(|e| {
                eprintln!("❌ Failed to read password: {}", e);
                std::process::exit(1);
            })
    });

    let admin = NewAdmin {
        email,
        name,
        password,
        position,
        phone,
    };

    match create_admin(pool, &admin).await {
        Ok(_) => {
            println!("\n✅ Admin created successfully!");
            println!("   Email: {}", admin.email);
            println!("   Name: {}", admin.name);
        }
        Err(e) => {
            eprintln!("\n❌ Error creating admin: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_seed(pool: &PgPool, students: usize, password: String) {
    let config = SeedConfig::new(password).with_students_per_class(students);

    if let Err(e) = seeder::seed_all(pool, config).await {
        eprintln!("\n❌ Error seeding database: {}", e);
        std::process::exit(1);
    }
}

async fn handle_seed_students(pool: &PgPool, students: usize, password: &str) {
    let classes = match seeder::students::active_year_classes(pool).await {
        Ok(classes) if classes.is_empty() => {
            eprintln!("❌ No classes in the active academic year. Run `seed` first.");
            std::process::exit(1);
        }
        Ok(classes) => classes,
        Err(e) => {
            eprintln!("\n❌ Error loading classes: {}", e);
            std::process::exit(1);
        }
    };

    match seeder::students::seed_students(pool, &classes, students, password).await {
        Ok(count) => println!("✅ Created {} students", count),
        Err(e) => {
            eprintln!("\n❌ Error seeding students: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_clear_students(pool: &PgPool) {
    if let Err(e) = seeder::students::clear_students(pool).await {
        eprintln!("\n❌ Error clearing students: {}", e);
        std::process::exit(1);
    }
}

async fn handle_purge_sessions(pool: &PgPool) {
    match purge_expired_sessions(pool).await {
        Ok(count) => println!("✅ Purged {} expired sessions", count),
        Err(e) => {
            eprintln!("\n❌ Error purging sessions: {}", e);
            std::process::exit(1);
        }
    }
}
