use std::fs;
use std::path::{Path, PathBuf};
#[cfg(any(target_os = "macos", target_os = "windows", target_os = "linux"))]
use std::process::Command;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use comfy_table::{Attribute, Cell, CellAlignment, Table};
use inquire::{Confirm, DateSelect, Text};
use log::debug;

use gst_invoice::config::{self, AppSettings};
use gst_invoice::format::format_currency;
use gst_invoice::render::install_default_template;
use gst_invoice::{
    CommandBackend, CompanyDetails, Exporter, InvoiceField, InvoiceForm, InvoiceRecord,
    InvoiceRenderer, InvoiceSession, InvoiceSnapshot, ItemField,
};

// ==========================================
// CLI
// ==========================================

#[derive(Parser)]
#[command(name = "gst-invoice", about = "Create GST tax invoices and export them as PDF")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in a new invoice interactively
    New,
    /// Export a draft invoice (TOML) to PDF without prompting
    Render {
        /// Draft file
        draft: PathBuf,
        /// Directory for the PDF (defaults to the configured output directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the computed invoice for a draft as JSON
    Snapshot {
        /// Draft file
        draft: PathBuf,
    },
    /// Configure output directory, renderer and templates
    Config,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let settings = config::load_settings().context("loading settings")?;
    debug!("settings: {:?}", settings);

    match command {
        Commands::New => {
            let company = load_company()?;
            let form = InvoiceForm::default().with_company(company);
            run_wizard(&settings, form)
        }
        Commands::Render { draft, output } => {
            let form = load_draft(&draft)?;
            let output_dir = output.unwrap_or_else(|| settings.output_path());
            let mut session = build_session(&settings, form, output_dir)?;
            session.open_preview().context("rendering invoice")?;
            let path = session.export().context("exporting invoice")?;
            println!("✅ PDF Generated: {}", path.display());
            Ok(())
        }
        Commands::Snapshot { draft } => {
            let form = load_draft(&draft)?;
            let snapshot = InvoiceSnapshot::capture(form.record());
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(())
        }
        Commands::Config => setup_config_wizard(settings),
    }
}

fn load_company() -> Result<CompanyDetails> {
    let path = config::company_path();
    let first_run = !path.exists();
    let company = config::load_company_from(&path).context("loading company details")?;
    if first_run {
        println!("✨ Initialized default company details at {}", path.display());
    }
    Ok(company)
}

fn load_draft(path: &Path) -> Result<InvoiceForm> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading draft {}", path.display()))?;
    let record: InvoiceRecord = toml::from_str(&content)
        .with_context(|| format!("parsing draft {}", path.display()))?;
    Ok(InvoiceForm::new(record))
}

fn build_session(
    settings: &AppSettings,
    form: InvoiceForm,
    output_dir: PathBuf,
) -> Result<InvoiceSession<CommandBackend>> {
    let renderer = match settings.templates_path() {
        Some(dir) => InvoiceRenderer::with_template_dir(&dir),
        None => InvoiceRenderer::new(),
    }
    .context("loading invoice template")?;

    let backend = CommandBackend::new(
        settings.renderer.program.clone(),
        settings.renderer.args.clone(),
    );
    Ok(InvoiceSession::new(form, renderer, Exporter::new(backend, output_dir)))
}

// ==========================================
// 1. Invoice Wizard
// ==========================================

fn run_wizard(settings: &AppSettings, mut form: InvoiceForm) -> Result<()> {
    println!("\n--- Company Details ---");
    ask_field(&mut form, InvoiceField::CompanyName, "Company Name:")?;
    ask_field(&mut form, InvoiceField::CompanyGstin, "GSTIN:")?;
    ask_field(&mut form, InvoiceField::CompanyAddress, "Address:")?;
    ask_field(&mut form, InvoiceField::CompanyPhone, "Phone:")?;
    ask_field(&mut form, InvoiceField::CompanyEmail, "Email:")?;

    println!("\n--- Invoice Details ---");
    ask_field(&mut form, InvoiceField::InvoiceNumber, "Invoice Number (e.g. INV-001):")?;
    ask_date(&mut form, InvoiceField::InvoiceDate, "Invoice Date:")?;
    ask_date(&mut form, InvoiceField::DueDate, "Due Date:")?;

    println!("\n--- Bill To ---");
    ask_field(&mut form, InvoiceField::ClientName, "Client Name:")?;
    ask_field(&mut form, InvoiceField::ClientGstin, "Client GSTIN:")?;
    ask_field(&mut form, InvoiceField::ClientAddress, "Client Address:")?;

    enter_invoice_items(&mut form)?;

    println!("\n--- GST & Charges ---");
    ask_field(&mut form, InvoiceField::CgstRate, "CGST Rate %:")?;
    ask_field(&mut form, InvoiceField::SgstRate, "SGST Rate %:")?;
    ask_field(&mut form, InvoiceField::PfCharge, "P&F Charge (optional):")?;
    ask_field(&mut form, InvoiceField::DeliveryCharge, "Delivery Charge (amount or text):")?;

    ask_field(&mut form, InvoiceField::Notes, "Notes (optional):")?;
    ask_field(&mut form, InvoiceField::Terms, "Terms & Conditions:")?;

    print_summary(&InvoiceSnapshot::capture(form.record()));

    if !Confirm::new("Preview & download invoice?")
        .with_default(true)
        .prompt()?
    {
        println!("Invoice discarded.");
        return Ok(());
    }

    let mut session = build_session(settings, form, settings.output_path())?;
    session.open_preview().context("rendering invoice")?;

    println!("\n🔨 Generating PDF...");
    match session.export() {
        Ok(path) => {
            println!("✅ PDF Generated: {}", path.display());
            open_file(&path);
        }
        Err(e) => println!("❌ {}", e),
    }
    Ok(())
}

fn current_value(form: &InvoiceForm, field: InvoiceField) -> String {
    let record = form.record();
    match field {
        InvoiceField::InvoiceNumber => record.invoice_number.clone(),
        InvoiceField::CompanyName => record.company.name.clone(),
        InvoiceField::CompanyAddress => record.company.address.clone(),
        InvoiceField::CompanyGstin => record.company.gstin.clone(),
        InvoiceField::CompanyPhone => record.company.phone.clone(),
        InvoiceField::CompanyEmail => record.company.email.clone(),
        InvoiceField::ClientName => record.client.name.clone(),
        InvoiceField::ClientAddress => record.client.address.clone(),
        InvoiceField::ClientGstin => record.client.gstin.clone(),
        InvoiceField::CgstRate => record.cgst_rate.clone(),
        InvoiceField::SgstRate => record.sgst_rate.clone(),
        InvoiceField::PfCharge => record.pf_charge.clone(),
        InvoiceField::DeliveryCharge => record.delivery_charge.clone(),
        InvoiceField::Notes => record.notes.clone(),
        InvoiceField::Terms => record.terms.clone(),
        InvoiceField::InvoiceDate | InvoiceField::DueDate => String::new(),
    }
}

fn ask_field(form: &mut InvoiceForm, field: InvoiceField, label: &str) -> Result<()> {
    let current = current_value(form, field);
    let value = Text::new(label).with_default(&current).prompt()?;
    form.set_field(field, &value);
    Ok(())
}

fn ask_date(form: &mut InvoiceForm, field: InvoiceField, label: &str) -> Result<()> {
    let record = form.record();
    let current = match field {
        InvoiceField::DueDate => record.due_date,
        _ => record.invoice_date,
    };
    let today = chrono::Local::now().date_naive();
    let prompt = DateSelect::new(label).with_default(current.unwrap_or(today));

    // Esc leaves the due date off the invoice; the invoice date is required.
    let date: Option<NaiveDate> = match field {
        InvoiceField::DueDate => prompt
            .with_help_message("Esc to leave the due date blank")
            .prompt_skippable()?,
        _ => Some(prompt.prompt()?),
    };
    form.set_date(field, date);
    Ok(())
}

fn enter_invoice_items(form: &mut InvoiceForm) -> Result<()> {
    println!("\n--- Enter Invoice Items ---");
    println!("(Leave Description empty to finish)");

    let mut filled = 0;
    loop {
        let desc = Text::new("Description (leave empty to finish):").prompt()?;
        if desc.trim().is_empty() {
            break;
        }

        let index = if filled == 0 { 0 } else { form.add_item() };
        form.set_item_field(index, ItemField::Description, &desc);

        let qty = Text::new("Quantity:").with_default("1").prompt()?;
        form.set_item_field(index, ItemField::Quantity, &qty);
        let rate = Text::new("Rate (₹):").prompt()?;
        form.set_item_field(index, ItemField::Rate, &rate);

        let item = &form.items()[index];
        println!("   = {}", format_currency(item.amount));
        filled += 1;
    }

    if filled == 0 {
        println!("⚠️  No items entered, the invoice will carry one blank row.");
    }
    Ok(())
}

fn print_summary(snapshot: &InvoiceSnapshot) {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("S.No"),
        Cell::new("Description"),
        Cell::new("Qty"),
        Cell::new("Rate"),
        Cell::new("Amount"),
    ]);

    for item in &snapshot.items {
        table.add_row(vec![
            Cell::new(item.position),
            Cell::new(&item.description),
            Cell::new(&item.quantity).set_alignment(CellAlignment::Center),
            Cell::new(&item.rate).set_alignment(CellAlignment::Right),
            Cell::new(&item.amount).set_alignment(CellAlignment::Right),
        ]);
    }

    let mut totals = vec![
        ("Subtotal".to_string(), snapshot.subtotal.clone()),
        (snapshot.cgst_label.clone(), snapshot.cgst.clone()),
        (snapshot.sgst_label.clone(), snapshot.sgst.clone()),
    ];
    if snapshot.show_pf_charge {
        totals.push(("P&F Charge".to_string(), snapshot.pf_charge.clone()));
    }
    totals.push(("Delivery Charge".to_string(), snapshot.delivery_charge.clone()));

    for (label, value) in totals {
        table.add_row(vec![
            Cell::new(""),
            Cell::new(label),
            Cell::new(""),
            Cell::new(""),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new(""),
        Cell::new("Total Amount").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
        Cell::new(&snapshot.total)
            .add_attribute(Attribute::Bold)
            .set_alignment(CellAlignment::Right),
    ]);

    println!("\n--- {} ---", snapshot.filename);
    println!("{table}");
}

// ==========================================
// 2. Config & Utilities
// ==========================================

fn setup_config_wizard(current: AppSettings) -> Result<()> {
    println!("\n⚙️  --- Configuration Setup ---");

    let output_dir = Text::new("Output Directory:")
        .with_default(&current.output_dir)
        .prompt()?;
    let program = Text::new("PDF Renderer (headless browser):")
        .with_default(&current.renderer.program)
        .prompt()?;
    let templates_input = Text::new("Templates Directory (optional, press Enter to skip):")
        .with_default(current.templates_dir.as_deref().unwrap_or(""))
        .prompt()?;
    let templates_dir = if templates_input.trim().is_empty() {
        None
    } else {
        Some(templates_input.trim().to_string())
    };

    let settings = AppSettings {
        output_dir,
        templates_dir,
        renderer: config::RendererSettings {
            program,
            args: current.renderer.args,
        },
    };

    if let Some(dir) = settings.templates_path() {
        let path = install_default_template(&dir)
            .with_context(|| format!("installing template into {}", dir.display()))?;
        println!("📄 Template: {}", path.display());
    }

    let path = config::settings_path();
    config::save_settings_to(&path, &settings)?;
    load_company()?;
    println!("✅ Settings saved to {}", path.display());
    println!("💡 Edit {} to prefill your company details.", config::company_path().display());
    Ok(())
}

fn open_file(path: &Path) {
    #[cfg(target_os = "macos")]
    Command::new("open").arg(path).spawn().ok();

    #[cfg(target_os = "windows")]
    Command::new("explorer").arg(path).spawn().ok();

    #[cfg(target_os = "linux")]
    Command::new("xdg-open").arg(path).spawn().ok();

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    let _ = path;
}
