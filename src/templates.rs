use tera::Tera;

pub const ADMIN_DASHBOARD: &str = "admin.html";

/// Templates are compiled into the binary; `.html` names get tera's autoescaping.
pub fn load() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template(ADMIN_DASHBOARD, include_str!("../templates/admin.html"))?;
    Ok(tera)
}
