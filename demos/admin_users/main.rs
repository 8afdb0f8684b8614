//! Admin users screen driven by the view engine over an in-memory API
//!
//! Run with `RUST_LOG=tabula=debug cargo run --example admin_users` to see
//! the fetch and mutation logs.

use tabula::prelude::*;
use tracing_subscriber::EnvFilter;

impl_record!(User, "users", ["name", "email"], {
    name: String,
    email: String,
    blocked: bool,
});

fn print_view(title: &str, view: &ViewController<User, InMemoryRecordApi<User>>) {
    println!("\n📋 {}", title);
    match view.display() {
        DisplayState::Loading => println!("   ⏳ Chargement..."),
        DisplayState::Errored { message } => println!("   ❌ {}", message),
        DisplayState::Loaded { is_empty: true, .. } => println!("   (aucun résultat)"),
        DisplayState::Loaded { items, window, .. } => {
            for user in &items {
                let lock = if user.blocked { "🔒" } else { "  " };
                println!("   {} {:<14} {}", lock, user.name, user.email);
            }
            println!(
                "   page {}/{} ({} résultats)",
                window.page, window.total_pages, window.total_count
            );
        }
    }
    if let Some(notice) = view.notice() {
        println!("   💬 {}", notice.message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("🚀 Tabula admin users example");

    let seed = vec![
        User::new("John Doe".to_string(), "john@example.com".to_string(), false),
        User::new("Jane Smith".to_string(), "jane@example.com".to_string(), false),
        User::new("Bob Johnson".to_string(), "bob@example.com".to_string(), false),
        User::new("Alice Martin".to_string(), "alice@example.com".to_string(), true),
    ];
    let api = InMemoryRecordApi::with_records(seed);

    let config = TabulaConfig::default_config();
    let mut view_config = config.view("admin-users")?.clone();
    view_config.page_size = 3;

    let session = SessionContext::Admin {
        admin_id: RecordId::from("admin-1"),
        token: "demo-token".to_string(),
    };
    let rules = FormRules::new()
        .filter("name", filters::trim())
        .filter("email", filters::lowercase())
        .validate("name", validators::required())
        .validate("email", validators::email());

    let mut view = ViewController::new(Arc::new(api), view_config, session).with_rules(rules);

    view.mount().await;
    print_view("Tous les utilisateurs", &view);

    view.next_page().await;
    print_view("Page suivante", &view);

    view.search("john").await;
    print_view("Recherche \"john\"", &view);

    let target = match view.display() {
        DisplayState::Loaded { items, .. } => items.first().map(|user| user.id.clone()),
        _ => None,
    };
    if let Some(id) = target {
        view.toggle_flag(&id, "blocked", true).await?;
        print_view("Après blocage", &view);
    }

    view.search("").await;
    view.sort_by("email");
    let mut fields = Fields::new();
    fields.insert("name".to_string(), FieldValue::from("  Nina Petit "));
    fields.insert("email".to_string(), FieldValue::from("Nina@Example.com"));
    fields.insert("blocked".to_string(), FieldValue::Boolean(false));
    view.create(fields).await?;
    print_view("Après création, tri par email", &view);

    let mut invalid = Fields::new();
    invalid.insert("name".to_string(), FieldValue::from(""));
    invalid.insert("email".to_string(), FieldValue::from("pas-un-email"));
    if let Err(e) = view.create(invalid).await {
        println!("\n⚠️  Création refusée: {}", e.user_message());
    }

    view.unmount();
    println!("\n✅ Done");
    Ok(())
}
