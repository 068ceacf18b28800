//! Page handlers for the coopanet banking portal.

use crate::capabilities::{Account, Transaction};
use crate::error::AdapterError;
use scraper::{Html, Selector};
use std::sync::LazyLock;

struct Selectors {
    accounts_table: Selector,
    account_row: Selector,
    account_link: Selector,
    balance_cell: Selector,
    coming_cell: Selector,
    history_table: Selector,
    transaction_row: Selector,
    date_cell: Selector,
    label_cell: Selector,
    amount_cell: Selector,
    category_cell: Selector,
    next_page: Selector,
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(|| Selectors {
    accounts_table: Selector::parse("table.comptes").unwrap(),
    account_row: Selector::parse("table.comptes tr.compte").unwrap(),
    account_link: Selector::parse("a.compte-label").unwrap(),
    balance_cell: Selector::parse("td.solde").unwrap(),
    coming_cell: Selector::parse("td.encours").unwrap(),
    history_table: Selector::parse("table.releve").unwrap(),
    transaction_row: Selector::parse("table.releve tr.operation").unwrap(),
    date_cell: Selector::parse("td.date").unwrap(),
    label_cell: Selector::parse("td.libelle").unwrap(),
    amount_cell: Selector::parse("td.montant").unwrap(),
    category_cell: Selector::parse("td.categorie").unwrap(),
    next_page: Selector::parse("a.releve-suivant").unwrap(),
});

/// Parses the accounts overview page.
pub fn parse_accounts(body: &str, backend: &str) -> Result<Vec<Account>, AdapterError> {
    let doc = Html::parse_document(body);

    if doc.select(&SELECTORS.accounts_table).next().is_none() {
        return Err(AdapterError::Extraction("accounts table".to_string()));
    }

    let mut accounts = Vec::new();
    for row in doc.select(&SELECTORS.account_row) {
        let link = row
            .select(&SELECTORS.account_link)
            .next()
            .ok_or_else(|| AdapterError::Extraction("account row label link".to_string()))?;
        let id = link
            .value()
            .attr("data-numero")
            .ok_or_else(|| AdapterError::Extraction("account number attribute".to_string()))?;

        let mut account = Account::new(id, backend);
        account
            .label
            .set(link.text().collect::<String>().trim().to_string());
        account.currency.set("EUR".to_string());
        account.balance = cell_amount(&row, &SELECTORS.balance_cell).into();
        account.coming = cell_amount(&row, &SELECTORS.coming_cell).into();

        accounts.push(account);
    }

    Ok(accounts)
}

/// Parses one history page into operations plus the next page link.
pub fn parse_transactions(
    body: &str,
    account_id: &str,
    backend: &str,
) -> Result<(Vec<Transaction>, Option<String>), AdapterError> {
    let doc = Html::parse_document(body);

    if doc.select(&SELECTORS.history_table).next().is_none() {
        return Err(AdapterError::Extraction("history table".to_string()));
    }

    let mut transactions = Vec::new();
    for row in doc.select(&SELECTORS.transaction_row) {
        let reference = row
            .value()
            .attr("data-ref")
            .ok_or_else(|| AdapterError::Extraction("operation reference".to_string()))?;

        let mut transaction =
            Transaction::new(format!("{}-{}", account_id, reference), backend);
        transaction.date = cell_text(&row, &SELECTORS.date_cell).into();
        transaction.label = cell_text(&row, &SELECTORS.label_cell).into();
        transaction.amount = cell_amount(&row, &SELECTORS.amount_cell).into();
        transaction.category = cell_text(&row, &SELECTORS.category_cell).into();

        transactions.push(transaction);
    }

    let next = doc
        .select(&SELECTORS.next_page)
        .next()
        .and_then(|elem| elem.value().attr("href"))
        .map(absolutize);

    Ok((transactions, next))
}

fn cell_text(row: &scraper::ElementRef, selector: &Selector) -> Option<String> {
    row.select(selector)
        .next()
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn cell_amount(row: &scraper::ElementRef, selector: &Selector) -> Option<f64> {
    cell_text(row, selector).and_then(|text| parse_amount(&text))
}

/// Parses a French-formatted amount like `1 234,56` or `-45,90 €`.
fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '-' || *c == '.')
        .collect();
    cleaned.replace(',', ".").parse().ok()
}

fn absolutize(href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("https://www.coopanet.com{}", href)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub const ACCOUNTS_FIXTURE: &str = r#"
<html><body>
<table class="comptes">
  <tr class="compte">
    <td><a class="compte-label" data-numero="00012345" href="/banque/cpt/cpt/situationcomptes.do?lnkReleveAction=X&numeroExterne=00012345">Compte courant</a></td>
    <td class="solde">1 234,56</td>
    <td class="encours">-120,00</td>
  </tr>
  <tr class="compte">
    <td><a class="compte-label" data-numero="00067890" href="/banque/cpt/cpt/situationcomptes.do?lnkReleveAction=X&numeroExterne=00067890">Livret A</a></td>
    <td class="solde">8 000,00</td>
    <td class="encours"></td>
  </tr>
</table>
</body></html>
"#;

    pub const HISTORY_PAGE_1: &str = r#"
<html><body>
<table class="releve">
  <tr class="operation" data-ref="OP001">
    <td class="date">02/08/2026</td>
    <td class="libelle">CB SUPERMARCHE</td>
    <td class="montant">-45,90</td>
    <td class="categorie">Courses</td>
  </tr>
  <tr class="operation" data-ref="OP002">
    <td class="date">01/08/2026</td>
    <td class="libelle">PRELEVEMENT EDF</td>
    <td class="montant">-89,00</td>
    <td class="categorie"></td>
  </tr>
</table>
<a class="releve-suivant" href="/banque/cpt/cpt/relevecompte.do?tri_page=2">Page suivante</a>
</body></html>
"#;

    pub const HISTORY_PAGE_2: &str = r#"
<html><body>
<table class="releve">
  <tr class="operation" data-ref="OP003">
    <td class="date">30/07/2026</td>
    <td class="libelle">VIREMENT SALAIRE</td>
    <td class="montant">1 800,00</td>
    <td class="categorie">Revenus</td>
  </tr>
</table>
</body></html>
"#;

    #[test]
    fn test_parse_accounts() {
        let accounts = parse_accounts(ACCOUNTS_FIXTURE, "coopanet").unwrap();
        assert_eq!(accounts.len(), 2);

        let first = &accounts[0];
        assert_eq!(first.id, "00012345");
        assert_eq!(first.label.value().unwrap(), "Compte courant");
        assert_eq!(*first.balance.value().unwrap(), 1234.56);
        assert_eq!(*first.coming.value().unwrap(), -120.0);

        // The savings account has no pending operations cell content.
        assert!(accounts[1].coming.is_empty());
    }

    #[test]
    fn test_parse_accounts_missing_table() {
        let err = parse_accounts("<html><body></body></html>", "coopanet").unwrap_err();
        assert!(matches!(err, AdapterError::Extraction(_)));
    }

    #[test]
    fn test_parse_transactions_with_next() {
        let (transactions, next) =
            parse_transactions(HISTORY_PAGE_1, "00012345", "coopanet").unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].id, "00012345-OP001");
        assert_eq!(transactions[0].label.value().unwrap(), "CB SUPERMARCHE");
        assert!(transactions[1].category.is_empty());
        assert_eq!(
            next.as_deref(),
            Some("https://www.coopanet.com/banque/cpt/cpt/relevecompte.do?tri_page=2")
        );
    }

    #[test]
    fn test_parse_transactions_last_page() {
        let (transactions, next) =
            parse_transactions(HISTORY_PAGE_2, "00012345", "coopanet").unwrap();
        assert_eq!(transactions.len(), 1);
        assert!(next.is_none());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1 234,56"), Some(1234.56));
        assert_eq!(parse_amount("-45,90 €"), Some(-45.9));
        assert_eq!(parse_amount("n/a"), None);
    }
}
