//! Text formatters for capability objects.
//!
//! One-line list renderings for search results and multi-line sheets
//! for detail views. A field only appears when it holds a real value;
//! empty and never-fetched fields are skipped, never printed as blanks.

use crate::capabilities::{
    Account, ChatMessage, Field, Movie, Person, Radio, Recipe, Subtitle, Torrent, Transaction,
};
use crate::console::Console;
use std::fmt::Display;
use std::fmt::Write;

/// Appends `Key: value` when the field holds a value.
fn kv<T: Display>(out: &mut String, key: &str, field: &Field<T>) {
    if let Some(value) = field.value() {
        let _ = writeln!(out, "{}: {}", key, value);
    }
}

/// One-line list entry: bold title, muted id, optional description.
fn list_line(console: &Console, title: &str, id: &str, description: Option<&str>) -> String {
    let mut line = format!("* {} {}", console.title(title), console.muted(&format!("({})", id)));
    if let Some(description) = description {
        let _ = write!(line, "\n    {}", description);
    }
    line
}

pub fn format_movie_line(console: &Console, movie: &Movie) -> String {
    let title = movie.original_title.value().map(String::as_str).unwrap_or("(untitled)");
    list_line(
        console,
        title,
        &movie.full_id(),
        movie.short_description.value().map(String::as_str),
    )
}

pub fn format_movie_info(console: &Console, movie: &Movie) -> String {
    let mut out = String::new();
    if let Some(title) = movie.original_title.value() {
        let _ = writeln!(out, "{}", console.title(title));
    }
    let _ = writeln!(out, "ID: {}", movie.full_id());
    kv(&mut out, "Released", &movie.release_date);
    kv(&mut out, "Country", &movie.country);
    if let Some(duration) = movie.duration.value() {
        let _ = writeln!(out, "Duration: {}min", duration);
    }
    kv(&mut out, "Note", &movie.note);

    if let Some(genres) = movie.genres.value() {
        let _ = writeln!(out, "\n{}", console.heading("Genres"));
        for genre in genres {
            let _ = writeln!(out, " * {}", genre);
        }
    }
    if let Some(roles) = movie.roles.value() {
        let _ = writeln!(out, "\n{}", console.heading("Related persons"));
        for (role, name) in roles {
            let _ = writeln!(out, " -- {}: {}", role, name);
        }
    }
    if let Some(pitch) = movie.pitch.value() {
        let _ = writeln!(out, "\n{}", console.heading("Story"));
        let _ = writeln!(out, "{}", pitch);
    }
    out
}

pub fn format_person_line(console: &Console, person: &Person) -> String {
    let name = person.name.value().map(String::as_str).unwrap_or("(unnamed)");
    list_line(
        console,
        name,
        &person.full_id(),
        person.short_description.value().map(String::as_str),
    )
}

pub fn format_person_info(console: &Console, person: &Person) -> String {
    let mut out = String::new();
    if let Some(name) = person.name.value() {
        let _ = writeln!(out, "{}", console.title(name));
    }
    let _ = writeln!(out, "ID: {}", person.full_id());
    kv(&mut out, "Birth date", &person.birth_date);
    kv(&mut out, "Birth place", &person.birth_place);
    kv(&mut out, "Nationality", &person.nationality);
    kv(&mut out, "Gender", &person.gender);

    if let Some(roles) = person.roles.value() {
        let _ = writeln!(out, "\n{}", console.heading("Related movies"));
        for (role, title) in roles {
            let _ = writeln!(out, " -- {}: {}", role, title);
        }
    }
    if let Some(biography) = person.short_biography.value() {
        let _ = writeln!(out, "\n{}", console.heading("Short biography"));
        let _ = writeln!(out, "{}", biography);
    }
    out
}

pub fn format_torrent_line(console: &Console, torrent: &Torrent) -> String {
    let name = torrent.name.value().map(String::as_str).unwrap_or("(unnamed)");
    let mut stats = Vec::new();
    if let Some(size) = torrent.size.value() {
        stats.push(format_size(*size));
    }
    if let Some(seeders) = torrent.seeders.value() {
        stats.push(format!("{} seeders", seeders));
    }
    if let Some(leechers) = torrent.leechers.value() {
        stats.push(format!("{} leechers", leechers));
    }
    let description = (!stats.is_empty()).then(|| stats.join(", "));
    list_line(console, name, &torrent.full_id(), description.as_deref())
}

pub fn format_torrent_info(console: &Console, torrent: &Torrent) -> String {
    let mut out = String::new();
    if let Some(name) = torrent.name.value() {
        let _ = writeln!(out, "{}", console.title(name));
    }
    let _ = writeln!(out, "ID: {}", torrent.full_id());
    if let Some(size) = torrent.size.value() {
        let _ = writeln!(out, "Size: {}", format_size(*size));
    }
    kv(&mut out, "Seeders", &torrent.seeders);
    kv(&mut out, "Leechers", &torrent.leechers);
    kv(&mut out, "URL", &torrent.url);
    kv(&mut out, "Magnet", &torrent.magnet);

    if let Some(files) = torrent.files.value() {
        let _ = writeln!(out, "\n{}", console.heading("Files"));
        for file in files {
            let _ = writeln!(out, " * {}", file);
        }
    }
    if let Some(description) = torrent.description.value() {
        let _ = writeln!(out, "\n{}", console.heading("Description"));
        let _ = writeln!(out, "{}", description);
    }
    out
}

pub fn format_subtitle_line(console: &Console, subtitle: &Subtitle) -> String {
    let name = subtitle.name.value().map(String::as_str).unwrap_or("(unnamed)");
    let mut stats = Vec::new();
    if let Some(language) = subtitle.language.value() {
        stats.push(language.clone());
    }
    if let Some(nb_cd) = subtitle.nb_cd.value() {
        stats.push(format!("{} CD", nb_cd));
    }
    let description = (!stats.is_empty()).then(|| stats.join(", "));
    list_line(console, name, &subtitle.full_id(), description.as_deref())
}

pub fn format_subtitle_info(console: &Console, subtitle: &Subtitle) -> String {
    let mut out = String::new();
    if let Some(name) = subtitle.name.value() {
        let _ = writeln!(out, "{}", console.title(name));
    }
    let _ = writeln!(out, "ID: {}", subtitle.full_id());
    kv(&mut out, "Language", &subtitle.language);
    kv(&mut out, "Nb CD", &subtitle.nb_cd);
    kv(&mut out, "URL", &subtitle.url);
    kv(&mut out, "Description", &subtitle.description);
    out
}

pub fn format_recipe_line(console: &Console, recipe: &Recipe) -> String {
    let title = recipe.title.value().map(String::as_str).unwrap_or("(untitled)");
    list_line(
        console,
        title,
        &recipe.full_id(),
        recipe.short_description.value().map(String::as_str),
    )
}

pub fn format_recipe_info(console: &Console, recipe: &Recipe) -> String {
    let mut out = String::new();
    if let Some(title) = recipe.title.value() {
        let _ = writeln!(out, "{}", console.title(title));
    }
    let _ = writeln!(out, "ID: {}", recipe.full_id());
    if let Some(nb_person) = recipe.nb_person.value() {
        let _ = writeln!(out, "For: {} persons", nb_person);
    }
    if let Some(minutes) = recipe.preparation_time.value() {
        let _ = writeln!(out, "Preparation: {}min", minutes);
    }
    if let Some(minutes) = recipe.cooking_time.value() {
        let _ = writeln!(out, "Cooking: {}min", minutes);
    }
    kv(&mut out, "Author", &recipe.author);
    kv(&mut out, "Picture", &recipe.picture_url);

    if let Some(ingredients) = recipe.ingredients.value() {
        let _ = writeln!(out, "\n{}", console.heading("Ingredients"));
        for ingredient in ingredients {
            let _ = writeln!(out, " * {}", ingredient);
        }
    }
    if let Some(instructions) = recipe.instructions.value() {
        let _ = writeln!(out, "\n{}", console.heading("Instructions"));
        let _ = writeln!(out, "{}", instructions);
    }
    if let Some(comments) = recipe.comments.value() {
        let _ = writeln!(out, "\n{}", console.heading("Comments"));
        for comment in comments {
            let _ = writeln!(out, " * {}", comment);
        }
    }
    out
}

pub fn format_radio_line(console: &Console, radio: &Radio) -> String {
    let title = radio.title.value().map(String::as_str).unwrap_or("(unnamed)");
    list_line(
        console,
        title,
        &radio.full_id(),
        radio.description.value().map(String::as_str),
    )
}

pub fn format_radio_info(console: &Console, radio: &Radio) -> String {
    let mut out = String::new();
    if let Some(title) = radio.title.value() {
        let _ = writeln!(out, "{}", console.title(title));
    }
    let _ = writeln!(out, "ID: {}", radio.full_id());
    kv(&mut out, "Description", &radio.description);
    if let Some(current) = radio.current.value() {
        let _ = writeln!(out, "Now playing: {} - {}", current.artist, current.title);
    }
    if let Some(streams) = radio.streams.value() {
        let _ = writeln!(out, "\n{}", console.heading("Streams"));
        for stream in streams {
            let _ = writeln!(out, " * {}: {}", stream.title, stream.url);
        }
    }
    out
}

pub fn format_account_line(console: &Console, account: &Account) -> String {
    let label = account.label.value().map(String::as_str).unwrap_or("(unlabeled)");
    let mut stats = Vec::new();
    if let Some(balance) = account.balance.value() {
        let currency = account.currency.value().map(String::as_str).unwrap_or("");
        stats.push(format!("{:.2} {}", balance, currency).trim().to_string());
    }
    if let Some(coming) = account.coming.value() {
        stats.push(format!("coming {:.2}", coming));
    }
    let description = (!stats.is_empty()).then(|| stats.join(", "));
    list_line(console, label, &account.full_id(), description.as_deref())
}

pub fn format_transaction_line(_console: &Console, transaction: &Transaction) -> String {
    let date = transaction.date.value().map(String::as_str).unwrap_or("----------");
    let label = transaction.label.value().map(String::as_str).unwrap_or("");
    match transaction.amount.value() {
        Some(amount) => format!("{}  {:>10.2}  {}", date, amount, label),
        None => format!("{}  {:>10}  {}", date, "", label),
    }
}

pub fn format_contact_line(console: &Console, person: &Person) -> String {
    format_person_line(console, person)
}

pub fn format_message_line(console: &Console, message: &ChatMessage) -> String {
    let direction = match message.outgoing.value() {
        Some(true) => ">",
        _ => "<",
    };
    let date = message.date.value().map(String::as_str).unwrap_or("");
    let content = message.content.value().map(String::as_str).unwrap_or("");
    format!("{} {} {}", direction, console.muted(date), content)
}

/// Renders a byte count as a human-readable size.
fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console() -> Console {
        Console::with_colors(false)
    }

    #[test]
    fn test_movie_info_skips_unloaded_fields() {
        let mut movie = Movie::new("m-1090", "cinesift");
        movie.original_title.set("The Matrix".to_string());
        movie.release_date = Field::Empty;

        let out = format_movie_info(&console(), &movie);
        assert!(out.contains("The Matrix"));
        assert!(out.contains("ID: m-1090@cinesift"));
        // Neither empty nor unloaded fields are rendered.
        assert!(!out.contains("Released"));
        assert!(!out.contains("Duration"));
        assert!(!out.contains("Story"));
    }

    #[test]
    fn test_movie_info_full_sheet() {
        let mut movie = Movie::new("m-1090", "cinesift");
        movie.original_title.set("The Matrix".to_string());
        movie.duration.set(136);
        movie.genres.set(vec!["action".to_string()]);
        movie.roles.set(vec![("actor".to_string(), "Keanu Reeves".to_string())]);
        movie.pitch.set("Welcome to the desert of the real.".to_string());

        let out = format_movie_info(&console(), &movie);
        assert!(out.contains("Duration: 136min"));
        assert!(out.contains("Genres"));
        assert!(out.contains(" -- actor: Keanu Reeves"));
        assert!(out.contains("desert of the real"));
    }

    #[test]
    fn test_torrent_line_stats() {
        let mut torrent = Torrent::new("abc-t1", "kickass");
        torrent.name.set("Big Buck Bunny".to_string());
        torrent.size.set(759_169_024);
        torrent.seeders.set(512);

        let out = format_torrent_line(&console(), &torrent);
        assert!(out.contains("Big Buck Bunny"));
        assert!(out.contains("724.0 MB"));
        assert!(out.contains("512 seeders"));
        assert!(!out.contains("leechers"));
    }

    #[test]
    fn test_transaction_line_alignment() {
        let mut transaction = Transaction::new("t1", "coopanet");
        transaction.date.set("02/08/2026".to_string());
        transaction.label.set("CB SUPERMARCHE".to_string());
        transaction.amount.set(-45.9);

        let out = format_transaction_line(&console(), &transaction);
        assert!(out.contains("02/08/2026"));
        assert!(out.contains("-45.90"));
        assert!(out.contains("CB SUPERMARCHE"));
    }

    #[test]
    fn test_message_direction() {
        let mut message = ChatMessage::new("m1", "adopteunmec");
        message.content.set("salut".to_string());
        message.outgoing.set(false);
        assert!(format_message_line(&console(), &message).starts_with('<'));

        message.outgoing.set(true);
        assert!(format_message_line(&console(), &message).starts_with('>'));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(759_169_024), "724.0 MB");
    }
}
