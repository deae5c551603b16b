//! The MCP tools, one per invoice session operation.

use crate::args::{AddItemArgs, ExportArgs, SetTaxArgs};
use crate::commands;
use crate::mcp::mcp_utils::tool_result;
use crate::mcp::InvoiceServer;
use crate::model::ClientDetails;
use crate::utils;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use rmcp::{tool, tool_router};
use tracing::info;

#[tool_router(vis = "pub(super)")]
impl InvoiceServer {
    #[tool]
    /// Initialize the invoice MCP service for this session and return usage instructions. You
    /// **MUST** call this **ONCE** before using other tools so that you have the full usage
    /// instructions. You **MAY** call it more than once if you have forgotten the usage
    /// instructions.
    async fn initialize_service(&self) -> Result<CallToolResult, McpError> {
        let mut initialized = self.initialized.lock().await;
        *initialized = true;
        Ok(CallToolResult::success(vec![rmcp::model::Content::text(
            include_str!("docs/INSTRUCTIONS.md"),
        )]))
    }

    /// Set the client details printed in the "Bill To" section of the invoice. Every field
    /// replaces the previous value; omitted fields become empty. A blank `invoice_number` prints
    /// as "0001".
    ///
    /// Only allowed while editing. Call `back_to_editing` first if the preview is open.
    ///
    /// # Example
    ///
    /// ```json
    /// {
    ///   "name": "Ada Obi",
    ///   "address": "12 Market Road, Jos",
    ///   "phone": "0803 000 0000",
    ///   "invoice_number": "0042"
    /// }
    /// ```
    #[tool]
    async fn set_client(
        &self,
        Parameters(client): Parameters<ClientDetails>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        let mut session = self.session.lock().await;
        tool_result(commands::set_client(&mut session, client))
    }

    /// Add a line item to the invoice. All four fields are text. The product and grade must not
    /// be empty. The unit price and quantity must be numbers greater than zero; thousands
    /// separators and a leading currency symbol are accepted. The amount is unit price times
    /// quantity.
    ///
    /// An invoice holds at most 5 items. Rejected items leave the invoice unchanged and the error
    /// says which field to correct. Only allowed while editing.
    ///
    /// # Example
    ///
    /// ```json
    /// {
    ///   "product": "Maize",
    ///   "grade": "Grade A",
    ///   "unit_price": "1,500",
    ///   "quantity": "20"
    /// }
    /// ```
    #[tool]
    async fn add_item(
        &self,
        Parameters(args): Parameters<AddItemArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: add_item called for '{}'", args.product);
        let mut session = self.session.lock().await;
        tool_result(commands::add_item(&self.config, &mut session, &args))
    }

    /// List the line items in the order they were added, with their amounts.
    #[tool]
    async fn list_items(&self) -> Result<CallToolResult, McpError> {
        require_init!(self);
        let session = self.session.lock().await;
        tool_result(commands::list_items(&self.config, &session))
    }

    /// Set the tax amount and return the new totals. The tax is a flat amount, not a rate. Text
    /// that is not a number counts as zero, and so does a negative amount. Only allowed while
    /// editing.
    #[tool]
    async fn set_tax(
        &self,
        Parameters(args): Parameters<SetTaxArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        let mut session = self.session.lock().await;
        tool_result(commands::set_tax(&self.config, &mut session, &args))
    }

    /// Return the subtotal, tax and total of the invoice as it stands.
    #[tool]
    async fn get_totals(&self) -> Result<CallToolResult, McpError> {
        require_init!(self);
        let session = self.session.lock().await;
        tool_result(commands::totals(&self.config, &session))
    }

    /// Open the invoice preview, dated today with the due date 10 days later, and return it. The
    /// invoice is read-only while the preview is open. Call this before `export_pdf`.
    #[tool]
    async fn go_to_preview(&self) -> Result<CallToolResult, McpError> {
        require_init!(self);
        let mut session = self.session.lock().await;
        tool_result(commands::preview(&self.config, &mut session, utils::today()))
    }

    /// Close the preview and go back to editing. The client details and items are kept.
    #[tool]
    async fn back_to_editing(&self) -> Result<CallToolResult, McpError> {
        require_init!(self);
        let mut session = self.session.lock().await;
        tool_result(commands::back(&mut session))
    }

    /// Export the previewed invoice as a PDF and return where it was written. The preview must be
    /// open. The file is named Hillsville_Farms_Invoice.pdf and an existing file of that name is
    /// replaced.
    ///
    /// # Parameters
    ///
    /// - `directory`: Where to write the PDF (optional). Defaults to the exports directory of the
    ///   invoice home.
    #[tool]
    async fn export_pdf(
        &self,
        Parameters(args): Parameters<ExportArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: export_pdf called");
        let mut session = self.session.lock().await;
        let out =
            commands::export_invoice(&self.config, &mut session, self.renderer.as_ref(), &args)
                .await;
        tool_result(out)
    }
}
