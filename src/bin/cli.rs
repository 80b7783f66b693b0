//! MedHere CLI
//!
//! Command-line interface for MedHere:
//! - Log in and manage the medication list
//! - Show and check off today's doses
//! - Print calendar pages
//! - Check drug interactions, including for a local FHIR bundle file

use clap::{Parser, Subcommand};
use medhere::fhir::{medication_names, read_bundle};
use medhere::interactions::{
    check_interactions, GeminiChecker, GeminiConfig, InteractionChecker, InteractionReport,
    StaticChecker,
};
use reqwest::{Method, RequestBuilder};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "medhere")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Medication reminders from the command line")]
#[command(long_about = "MedHere keeps your medication list, shows which doses are due,\nand checks your medications for interactions.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8082", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Session token from `medhere login`
    #[arg(long, env = "MEDHERE_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and print a session token
    Login {
        /// User id (see `medhere users`)
        user_id: String,
        /// Password (any non-empty value)
        #[arg(short, long)]
        password: String,
    },

    /// List the users that can log in
    Users,

    /// Show API status
    Status,

    /// List your medications
    List,

    /// Add a medication
    Add {
        /// Medication name
        name: String,
        /// Amount per dose
        #[arg(short, long)]
        dose: f64,
        /// Unit of the amount
        #[arg(short, long, default_value = "mg")]
        unit: String,
        /// Frequency ("Once daily", "Twice daily", "Weekly", "As needed", ...)
        #[arg(short = 'F', long, default_value = "Once daily")]
        frequency: String,
        /// Time of day, repeatable (e.g. 08:00, "8:00 PM")
        #[arg(short, long = "time")]
        times: Vec<String>,
        /// Only on these weekdays (e.g. mon,wed,fri)
        #[arg(long, value_delimiter = ',')]
        days: Vec<String>,
        /// First day (YYYY-MM-DD, default: today)
        #[arg(long)]
        start: Option<String>,
        /// Last day (YYYY-MM-DD)
        #[arg(long, conflicts_with = "no_end")]
        end: Option<String>,
        /// Take indefinitely
        #[arg(long)]
        no_end: bool,
        /// Reason for taking it
        #[arg(long)]
        reason: Option<String>,
        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
        /// Refill date (YYYY-MM-DD)
        #[arg(long)]
        refill: Option<String>,
    },

    /// Delete a medication
    Remove {
        /// Medication id
        id: u64,
    },

    /// Show the doses due on a day
    Today {
        /// Day (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Flip a dose between taken and not taken
    Take {
        /// Dose key shown by `medhere today`
        key: String,
        /// Day (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Show upcoming refills
    Refills {
        /// Days ahead to look
        #[arg(short, long, default_value = "7")]
        days: i64,
    },

    /// Print a calendar page
    Calendar {
        /// day, week or month
        #[arg(short, long, default_value = "week")]
        view: String,
        /// Any day on the page (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Check drug interactions, for the given names or your own list
    Interactions {
        /// Medication names (default: your medication list)
        names: Vec<String>,
    },

    /// Check the medications in a local FHIR bundle file for interactions
    CheckFhir {
        /// Path to a FHIR Bundle JSON file
        path: PathBuf,
        /// Use the built-in table even when GEMINI_API_KEY is set
        #[arg(long)]
        offline: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

struct Api {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl Api {
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url.trim_end_matches('/'), path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and return the JSON body, exiting on any failure
    async fn send(&self, builder: RequestBuilder) -> Value {
        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Cannot connect to MedHere API at {}", self.base_url);
                eprintln!("Error: {}", e);
                eprintln!();
                eprintln!("Make sure the MedHere API server is running:");
                eprintln!("  cargo run --bin medhere");
                std::process::exit(1);
            }
        };

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if status == reqwest::StatusCode::UNAUTHORIZED {
            eprintln!("Not logged in. Run `medhere login <user_id> -p <password>` and set MEDHERE_TOKEN.");
            std::process::exit(1);
        }
        if !status.is_success() {
            let message = body["error"]["message"].as_str().unwrap_or("unknown error");
            eprintln!("Failed ({}): {}", status, message);
            std::process::exit(1);
        }

        body
    }

    async fn get(&self, path: &str) -> Value {
        self.send(self.request(Method::GET, path)).await
    }

    async fn post(&self, path: &str, body: Value) -> Value {
        self.send(self.request(Method::POST, path).json(&body)).await
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let json_output = cli.format == "json";
    let api = Api {
        client: reqwest::Client::new(),
        base_url: cli.api_url.clone(),
        token: cli.token.clone(),
    };

    match cli.command {
        Commands::Login { user_id, password } => {
            let body = api
                .post("/api/auth/login", json!({"user_id": user_id, "password": password}))
                .await;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("Logged in as {}", body["user"]["name"].as_str().unwrap_or("-"));
                if let Some(seeded) = body["seeded"].as_u64().filter(|n| *n > 0) {
                    println!("Added {} demo medications to your list", seeded);
                }
                println!();
                println!("export MEDHERE_TOKEN={}", body["token"].as_str().unwrap_or(""));
            }
        }

        Commands::Users => {
            let body = api.get("/api/users").await;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{:<6} {}", "ID", "Name");
                println!("{}", "-".repeat(30));
                for user in body["users"].as_array().into_iter().flatten() {
                    println!(
                        "{:<6} {}",
                        user["id"].as_str().unwrap_or("-"),
                        user["name"].as_str().unwrap_or("-")
                    );
                }
            }
        }

        Commands::Status => {
            let health = api.get("/api/health").await;

            println!("MedHere v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("API Status: {}", health["status"].as_str().unwrap_or("unknown"));
            println!(
                "Interaction checker: {}",
                health["interaction_checker"].as_str().unwrap_or("unknown")
            );
            println!("Active sessions: {}", health["active_sessions"].as_u64().unwrap_or(0));
            if let Some(uptime) = health["uptime_seconds"].as_u64() {
                println!();
                println!("Uptime: {}", format_duration(uptime));
            }
        }

        Commands::List => {
            let body = api.get("/api/medications").await;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print_medications(&body["medications"]);
            }
        }

        Commands::Add {
            name,
            dose,
            unit,
            frequency,
            times,
            days,
            start,
            end,
            no_end,
            reason,
            notes,
            refill,
        } => {
            let start = start.unwrap_or_else(|| chrono::Local::now().date_naive().to_string());
            let body = json!({
                "name": name,
                "dosage_amount": dose,
                "dosage_unit": unit,
                "frequency": frequency,
                "times": times,
                "days": days,
                "start_date": start,
                "end_date": end,
                "no_end_date": no_end,
                "reason": reason,
                "notes": notes,
                "refill_date": refill,
            });

            let med = api.post("/api/medications", body).await;
            println!(
                "Added {} ({}) with id {}",
                med["name"].as_str().unwrap_or("-"),
                med["frequency_text"].as_str().unwrap_or("-"),
                med["id"]
            );
        }

        Commands::Remove { id } => {
            let body = api
                .send(api.request(Method::DELETE, &format!("/api/medications/{}", id)))
                .await;
            println!("Deleted {}", body["name"].as_str().unwrap_or("medication"));
        }

        Commands::Today { date } => {
            let path = match date {
                Some(d) => format!("/api/doses?date={}", urlencoding::encode(&d)),
                None => "/api/doses".to_string(),
            };
            let body = api.get(&path).await;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("Doses for {}", body["date"].as_str().unwrap_or("-"));
                println!();
                print_doses(&body["doses"]);
                let summary = &body["summary"];
                println!();
                println!(
                    "{} taken, {} missed, {} upcoming, {} as needed",
                    summary["taken"], summary["missed"], summary["upcoming"], summary["as_needed"]
                );
            }
        }

        Commands::Take { key, date } => {
            let body = api
                .post("/api/doses/toggle", json!({"key": key, "date": date}))
                .await;
            let state = if body["taken"].as_bool().unwrap_or(false) {
                "taken"
            } else {
                "not taken"
            };
            println!("{} marked {} on {}", key, state, body["date"].as_str().unwrap_or("-"));
        }

        Commands::Refills { days } => {
            let body = api.get(&format!("/api/refills?days={}", days)).await;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                let meds = body["medications"].as_array().cloned().unwrap_or_default();
                if meds.is_empty() {
                    println!("No refills due in the next {} days.", days);
                }
                for med in meds {
                    println!(
                        "{:<20} refill on {}",
                        med["name"].as_str().unwrap_or("-"),
                        med["refill_date"].as_str().unwrap_or("-")
                    );
                }
            }
        }

        Commands::Calendar { view, date } => {
            let mut path = format!("/api/calendar?view={}", urlencoding::encode(&view));
            if let Some(d) = date {
                path.push_str(&format!("&date={}", urlencoding::encode(&d)));
            }
            let page = api.get(&path).await;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                println!("{}", page["title"].as_str().unwrap_or("-"));
                for day in page["days"].as_array().into_iter().flatten() {
                    println!();
                    let marker = if day["is_today"].as_bool().unwrap_or(false) {
                        " (today)"
                    } else {
                        ""
                    };
                    println!(
                        "{} {}{}",
                        day["weekday"].as_str().unwrap_or(""),
                        day["date"].as_str().unwrap_or("-"),
                        marker
                    );
                    print_doses(&day["doses"]);
                }
            }
        }

        Commands::Interactions { names } => {
            let report: InteractionReport = if names.is_empty() {
                let body = api.get("/api/medications/interactions").await;
                serde_json::from_value(body)?
            } else {
                let body = api
                    .post("/api/check-interactions", json!({"medications": names}))
                    .await;
                serde_json::from_value(body)?
            };

            if json_output {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }

        Commands::CheckFhir { path, offline } => {
            println!("--- Reading patient data from {} ---", path.display());
            let bundle = match read_bundle(&path) {
                Ok(b) => b,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            };

            let drugs = medication_names(&bundle);
            if drugs.is_empty() {
                println!("No medication names found in the patient file.");
                return Ok(());
            }
            println!("Found {} unique medication(s): {:?}", drugs.len(), drugs);

            if drugs.len() < 2 {
                println!("Not enough medications found to check for interactions.");
                return Ok(());
            }

            let checker: Box<dyn InteractionChecker> = match std::env::var("GEMINI_API_KEY") {
                Ok(key) if !offline && !key.trim().is_empty() => {
                    println!();
                    println!("--- Calling Google AI for interaction analysis... ---");
                    Box::new(GeminiChecker::new(GeminiConfig {
                        api_key: Some(key),
                        ..Default::default()
                    }))
                }
                _ => Box::new(StaticChecker::new()),
            };

            match check_interactions(checker.as_ref(), &drugs).await {
                Ok(report) if json_output => println!("{}", serde_json::to_string_pretty(&report)?),
                Ok(report) => print_report(&report),
                Err(e) => {
                    eprintln!("Could not retrieve interaction data: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Config { output } => {
            let config = medhere::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

fn print_medications(meds: &Value) {
    let meds = meds.as_array().cloned().unwrap_or_default();
    if meds.is_empty() {
        println!("No medications yet.");
        println!();
        println!("Add your first one with:");
        println!("  medhere add Tylenol --dose 650 --time 08:00");
        return;
    }

    println!("{:<16} {:<18} {:<10} {:<36} {}", "ID", "Name", "Dosage", "Frequency", "Dates");
    println!("{}", "-".repeat(110));

    for med in meds {
        println!(
            "{:<16} {:<18} {:<10} {:<36} {}",
            med["id"],
            med["name"].as_str().unwrap_or("-"),
            med["dosage_text"].as_str().unwrap_or("-"),
            med["frequency_text"].as_str().unwrap_or("-"),
            med["date_range"].as_str().unwrap_or("-")
        );
    }
}

fn print_doses(doses: &Value) {
    let doses = doses.as_array().cloned().unwrap_or_default();
    if doses.is_empty() {
        println!("  No doses scheduled");
        return;
    }

    for dose in doses {
        let check = if dose["taken"].as_bool().unwrap_or(false) {
            "[x]"
        } else {
            "[ ]"
        };
        println!(
            "  {} {:<9} {:<18} {:<10} {:<10} {}",
            check,
            dose["time_label"].as_str().unwrap_or("-"),
            dose["name"].as_str().unwrap_or("-"),
            dose["dosage"].as_str().unwrap_or("-"),
            dose["status"].as_str().unwrap_or("-"),
            dose["key"].as_str().unwrap_or("-")
        );
    }
}

fn print_report(report: &InteractionReport) {
    if report.is_empty() {
        println!();
        println!("--- Result: No clinically significant drug interactions found. ---");
        return;
    }

    println!();
    println!("--- Found Potential Drug Interactions: ---");
    for interaction in &report.interactions {
        println!();
        println!("Interaction between: {}", interaction.drug_pair());
        println!("  Severity: {}", interaction.severity);
        println!("  Description: {}", interaction.description);
    }
}
