//! Item CLI commands

use anyhow::Result;

use super::output::Output;
use crate::domain::{ReorderRequest, TodoItem};
use crate::service::ItemsService;

pub fn add(
    output: &Output,
    service: &mut ItemsService,
    text: &str,
    id: Option<String>,
    order: Option<i64>,
) -> Result<()> {
    let id = id.unwrap_or_default();

    let item = match order {
        Some(order) => service.add_item(TodoItem::with_id(id, text, order))?,
        None => service.append_item_with_id(id, text)?,
    };

    if output.is_json() {
        output.data(&item);
    } else {
        output.success(&format!(
            "Added item {} at order {}: {}",
            item.id, item.order, item.item
        ));
    }

    Ok(())
}

pub fn get(output: &Output, service: &mut ItemsService, id: &str) -> Result<()> {
    let item = service.get_item(id)?;

    if output.is_json() {
        output.data(&item);
    } else {
        println!("ID:    {}", item.id);
        println!("Order: {}", item.order);
        println!("Item:  {}", item.item);
    }

    Ok(())
}

pub fn list(output: &Output, service: &mut ItemsService) -> Result<()> {
    let list = service.list_items()?;

    if output.is_json() {
        output.data(&list);
        return Ok(());
    }

    if list.is_empty() {
        println!("No items.");
        return Ok(());
    }

    output.row(&["ORDER", "ID", "ITEM"]);
    for item in &list.items {
        output.row(&[item.order.to_string().as_str(), item.id.as_str(), item.item.as_str()]);
    }
    println!();
    println!("{} item(s)", list.count);

    Ok(())
}

pub fn update(
    output: &Output,
    service: &mut ItemsService,
    id: &str,
    text: &str,
    order: i64,
) -> Result<()> {
    let item = service.update_item(id, TodoItem::new(text, order))?;

    if output.is_json() {
        output.data(&item);
    } else {
        output.success(&format!("Updated item {} (order {})", item.id, item.order));
    }

    Ok(())
}

pub fn delete(output: &Output, service: &mut ItemsService, id: &str) -> Result<()> {
    service.delete_item(id)?;

    if output.is_json() {
        output.data(&serde_json::json!({ "deleted": id }));
    } else {
        output.success(&format!("Deleted item {}", id));
    }

    Ok(())
}

pub fn reorder(output: &Output, service: &mut ItemsService, id: &str, order: i64) -> Result<()> {
    let item = service.reorder_item(id, ReorderRequest { order })?;

    if output.is_json() {
        output.data(&item);
    } else {
        output.success(&format!("Moved item {} to order {}", item.id, item.order));
    }

    Ok(())
}

/// Fails when the orders are not exactly 1..=N
pub fn verify(output: &Output, service: &mut ItemsService) -> Result<()> {
    let report = service.verify()?;

    if output.is_json() {
        output.data(&report);
    } else if report.is_dense() {
        println!("Ordering is dense ({} item(s))", report.count);
    } else {
        println!("Ordering is not dense ({} item(s))", report.count);
        if !report.missing.is_empty() {
            println!("  Missing:    {:?}", report.missing);
        }
        if !report.duplicates.is_empty() {
            println!("  Duplicates: {:?}", report.duplicates);
        }
        if !report.stray.is_empty() {
            println!("  Stray:      {:?}", report.stray);
        }
    }

    if !report.is_dense() {
        anyhow::bail!("Item ordering has gaps or duplicates");
    }

    Ok(())
}
