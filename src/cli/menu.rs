//! Interactive menu
//!
//! Line-oriented front end over a [`PaymentStore`]. Raw input is checked and
//! re-prompted here; the store still validates everything it receives.
//!
//! The menu reads from any `BufRead` and writes to any `Write`, so sessions
//! can be scripted in tests. End of input ends the session.

use crate::core::matcher::{resolve_service, ServiceMatch};
use crate::core::validator::{parse_date, validate_amount, validate_payer};
use crate::core::{PaymentStore, Storage};
use crate::types::{
    NewPayment, PaymentError, PaymentRecord, PaymentUpdate, ServiceType, MAX_PAYER_LEN,
};
use rust_decimal::Decimal;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

/// One-line rendering used by every listing
pub fn format_record(record: &PaymentRecord) -> String {
    format!(
        "{} | {} | {} | {:.2} | {}",
        record.id, record.payer, record.service_type, record.amount, record.date
    )
}

/// Interactive session bound to a store
pub struct Menu<'a, S: Storage, R: BufRead, W: Write> {
    store: &'a mut PaymentStore<S>,
    input: R,
    output: W,
}

impl<'a, S: Storage, R: BufRead, W: Write> Menu<'a, S, R, W> {
    pub fn new(store: &'a mut PaymentStore<S>, input: R, output: W) -> Self {
        Self {
            store,
            input,
            output,
        }
    }

    /// Run the menu until the user exits or input ends
    ///
    /// # Errors
    ///
    /// Only terminal I/O failures are returned; store errors are reported to
    /// the user and the menu continues.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.display_menu()?;
            let Some(choice) = self.prompt("Enter your choice: ")? else {
                writeln!(self.output, "\nExiting program...")?;
                return Ok(());
            };

            let completed = match choice.trim() {
                "1" => self.add_payment()?,
                "2" => self.search_payment()?,
                "3" => self.update_payment()?,
                "4" => self.delete_payment()?,
                "5" => self.display_payments().map(Some)?,
                "0" => {
                    writeln!(self.output, "Exiting program...")?;
                    return Ok(());
                }
                _ => {
                    writeln!(self.output, "Invalid menu!")?;
                    Some(())
                }
            };

            if completed.is_none() {
                writeln!(self.output, "\nExiting program...")?;
                return Ok(());
            }
        }
    }

    fn display_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n===== Payment Management System =====")?;
        writeln!(self.output, "1. Add Payment")?;
        writeln!(self.output, "2. Search Payment")?;
        writeln!(self.output, "3. Update Payment")?;
        writeln!(self.output, "4. Delete Payment")?;
        writeln!(self.output, "5. Display All Payments")?;
        writeln!(self.output, "0. Exit")?;
        writeln!(self.output, "=====================================")
    }

    // Each operation returns Ok(None) when input ran out mid-way.

    fn add_payment(&mut self) -> io::Result<Option<()>> {
        if self.store.is_full() {
            writeln!(
                self.output,
                "Cannot add more records (store full: {} records)",
                self.store.capacity()
            )?;
            return Ok(Some(()));
        }

        let Some(payer) = self.read_payer("Enter Payer Name: ")? else {
            return Ok(None);
        };
        let Some(service) = self.read_service("Enter Service Type: ")? else {
            return Ok(None);
        };
        let Some(amount) = self.read_amount("Enter Amount: ")? else {
            return Ok(None);
        };
        let Some(date) = self.read_date("Enter Payment Date (YYYY-MM-DD): ")? else {
            return Ok(None);
        };

        match self
            .store
            .add(NewPayment::new(payer, service.name(), amount, date))
        {
            Ok(id) => writeln!(self.output, "Payment added with ID {}!", id)?,
            Err(e) => self.report_error(&e)?,
        }
        Ok(Some(()))
    }

    fn search_payment(&mut self) -> io::Result<Option<()>> {
        writeln!(self.output, "Search by: 1. Payment ID  2. Payer Name")?;
        let Some(mode) = self.prompt("Enter your choice: ")? else {
            return Ok(None);
        };

        match mode.trim() {
            "1" => {
                let Some(id) = self.prompt("Enter Payment ID to search: ")? else {
                    return Ok(None);
                };
                let line = self.store.find_by_id(&id).map(format_record);
                match line {
                    Ok(line) => writeln!(self.output, "Found: {}", line)?,
                    Err(_) => writeln!(self.output, "Payment not found!")?,
                }
            }
            "2" => {
                let Some(keyword) = self.prompt("Enter payer name keyword: ")? else {
                    return Ok(None);
                };
                let lines: Vec<String> = self
                    .store
                    .search_by_name(&keyword)
                    .into_iter()
                    .map(format_record)
                    .collect();
                if lines.is_empty() {
                    writeln!(self.output, "No payments found.")?;
                } else {
                    writeln!(self.output, "Found {} payment(s):", lines.len())?;
                    for line in lines {
                        writeln!(self.output, "{}", line)?;
                    }
                }
            }
            _ => writeln!(self.output, "Invalid choice!")?,
        }
        Ok(Some(()))
    }

    fn update_payment(&mut self) -> io::Result<Option<()>> {
        let Some(id) = self.prompt("Enter Payment ID to update: ")? else {
            return Ok(None);
        };
        let current = match self.store.find_by_id(&id) {
            Ok(record) => format_record(record),
            Err(_) => {
                writeln!(self.output, "Payment not found!")?;
                return Ok(Some(()));
            }
        };
        writeln!(self.output, "Current Data: {}", current)?;

        let mut changes = PaymentUpdate::default();
        loop {
            writeln!(self.output, "\n--- Select field to update ---")?;
            writeln!(self.output, "1. Payer Name")?;
            writeln!(self.output, "2. Service Type")?;
            writeln!(self.output, "3. Amount")?;
            writeln!(self.output, "4. Payment Date")?;
            writeln!(self.output, "0. Finish")?;
            let Some(field) = self.prompt("Enter your choice: ")? else {
                return Ok(None);
            };

            match field.trim() {
                "1" => match self.read_payer("New Payer Name: ")? {
                    Some(payer) => changes.payer = Some(payer),
                    None => return Ok(None),
                },
                "2" => match self.read_service("New Service Type: ")? {
                    Some(service) => changes.service = Some(service.name().to_string()),
                    None => return Ok(None),
                },
                "3" => match self.read_amount("New Amount: ")? {
                    Some(amount) => changes.amount = Some(amount),
                    None => return Ok(None),
                },
                "4" => match self.read_date("New Payment Date (YYYY-MM-DD): ")? {
                    Some(date) => changes.date = Some(date),
                    None => return Ok(None),
                },
                "0" => break,
                _ => writeln!(self.output, "Invalid choice!")?,
            }
        }

        if changes.is_empty() {
            writeln!(self.output, "No changes made.")?;
            return Ok(Some(()));
        }
        match self.store.update(&id, changes) {
            Ok(()) => writeln!(self.output, "Payment updated!")?,
            Err(e) => self.report_error(&e)?,
        }
        Ok(Some(()))
    }

    fn delete_payment(&mut self) -> io::Result<Option<()>> {
        let Some(id) = self.prompt("Enter Payment ID to delete: ")? else {
            return Ok(None);
        };

        match self.store.delete(&id) {
            Ok(removed) => writeln!(self.output, "Payment {} deleted!", removed.id)?,
            Err(PaymentError::NotFound { .. }) => writeln!(self.output, "Payment not found!")?,
            Err(e) => self.report_error(&e)?,
        }
        Ok(Some(()))
    }

    fn display_payments(&mut self) -> io::Result<()> {
        writeln!(
            self.output,
            "\n--- All Payments ({} records) ---",
            self.store.len()
        )?;
        for record in self.store.list() {
            writeln!(self.output, "{}", format_record(record))?;
        }
        Ok(())
    }

    fn report_error(&mut self, error: &PaymentError) -> io::Result<()> {
        match error {
            PaymentError::PersistenceError { .. } => writeln!(
                self.output,
                "Warning: {}. The change is kept in memory and will be saved with the next change.",
                error
            ),
            _ => writeln!(self.output, "Error: {}", error),
        }
    }

    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(|c| c == '\r' || c == '\n').to_string()))
    }

    fn read_payer(&mut self, label: &str) -> io::Result<Option<String>> {
        loop {
            let Some(payer) = self.prompt(label)? else {
                return Ok(None);
            };
            if validate_payer(&payer) {
                return Ok(Some(payer.trim().to_string()));
            }
            writeln!(
                self.output,
                "Payer name must be 1-{} characters.",
                MAX_PAYER_LEN
            )?;
        }
    }

    fn read_service(&mut self, label: &str) -> io::Result<Option<ServiceType>> {
        loop {
            let Some(input) = self.prompt(label)? else {
                return Ok(None);
            };

            let matched = resolve_service(&input);
            match &matched {
                ServiceMatch::Unique(service) => return Ok(Some(*service)),
                ServiceMatch::NoMatch => {
                    let catalog: Vec<&str> = ServiceType::ALL.iter().map(|s| s.name()).collect();
                    writeln!(
                        self.output,
                        "No service type matches '{}'. Available: {}",
                        input.trim(),
                        catalog.join(", ")
                    )?;
                }
                ServiceMatch::Ambiguous(candidates) => {
                    writeln!(self.output, "Multiple service types match:")?;
                    for (i, service) in candidates.iter().enumerate() {
                        writeln!(self.output, "  {}. {}", i + 1, service)?;
                    }
                    let label = format!("Select service type (1-{}): ", candidates.len());
                    let Some(choice) = self.prompt(&label)? else {
                        return Ok(None);
                    };
                    match choice.trim().parse::<usize>().ok().and_then(|c| matched.select(c)) {
                        Some(service) => return Ok(Some(service)),
                        None => writeln!(self.output, "Invalid selection.")?,
                    }
                }
            }
        }
    }

    fn read_amount(&mut self, label: &str) -> io::Result<Option<Decimal>> {
        loop {
            let Some(input) = self.prompt(label)? else {
                return Ok(None);
            };
            match Decimal::from_str(input.trim()) {
                Ok(amount) if validate_amount(amount) => return Ok(Some(amount)),
                Ok(_) => writeln!(self.output, "Amount must be between 1 and 10000.")?,
                Err(_) => writeln!(self.output, "Invalid amount. Please enter a number.")?,
            }
        }
    }

    fn read_date(&mut self, label: &str) -> io::Result<Option<String>> {
        loop {
            let Some(input) = self.prompt(label)? else {
                return Ok(None);
            };
            if parse_date(&input).is_some() {
                return Ok(Some(input.trim().to_string()));
            }
            writeln!(
                self.output,
                "Invalid date. Use YYYY-MM-DD, a real calendar date from 2020 on."
            )?;
        }
    }
}
