use anyhow::Result;
use hwcal_core::Config;
use hwcal_ui::render::{render_admin, render_home};
use hwcal_ui::{AppServices, Route};

fn main() -> Result<()> {
    // Initialize core
    hwcal_core::init()?;

    let (config, _) = Config::load_validated()?;
    let services = AppServices::new(config)?;

    let route = std::env::args()
        .nth(1)
        .map(|arg| Route::parse(&arg))
        .unwrap_or_default();
    let today = chrono::Local::now().date_naive();
    let theme = services.theme_model().theme();

    tracing::info!("Homework calendar started ({})", route.path());

    match route {
        Route::Home => {
            let mut home = services.home_model(today);
            home.activate();
            services.block_on(home.settle());
            print!("{}", render_home(&home, theme));
        }
        Route::Admin => {
            let mut admin = services.admin_model(today);
            admin.activate();
            services.block_on(admin.settle());

            // Non-interactive sign-in for scripted use
            if let (Ok(email), Ok(password)) = (
                std::env::var("HWCAL_EMAIL"),
                std::env::var("HWCAL_PASSWORD"),
            ) {
                if !admin.is_authenticated() {
                    admin.set_email(&email);
                    admin.set_password(&password);
                    if let Err(e) = admin.sign_in() {
                        tracing::warn!("Sign-in skipped: {}", e);
                    }
                    services.block_on(admin.settle());
                }
            }
            print!("{}", render_admin(&admin, theme));
        }
    }

    // Graceful shutdown
    services.shutdown();

    Ok(())
}
