use crate::models::Charges;

pub const BROKERAGE_RATE: f64 = 0.0003;
pub const STT_RATE: f64 = 0.001;
pub const TRANSACTION_RATE: f64 = 0.00003;
// applied to brokerage + transaction charges only
pub const GST_RATE: f64 = 0.18;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeBreakdown {
    pub order_value: f64,
    pub brokerage: f64,
    pub stt: f64,
    pub transaction_charges: f64,
    pub gst: f64,
    pub total: f64,
}

pub fn compute(quantity: i64, price: f64) -> ChargeBreakdown {
    let order_value = (quantity as f64) * price;

    let brokerage = order_value * BROKERAGE_RATE;
    let stt = order_value * STT_RATE;
    let transaction_charges = order_value * TRANSACTION_RATE;
    let gst = (brokerage + transaction_charges) * GST_RATE;
    let total = brokerage + stt + transaction_charges + gst;

    ChargeBreakdown {
        order_value,
        brokerage,
        stt,
        transaction_charges,
        gst,
        total,
    }
}

fn fmt2(v: f64) -> String {
    format!("{:.2}", v)
}

impl ChargeBreakdown {
    pub fn is_finite(&self) -> bool {
        [
            self.order_value,
            self.brokerage,
            self.stt,
            self.transaction_charges,
            self.gst,
            self.total,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// Rounds every component independently; `total` is rounded from the
    /// unrounded sum, not summed from the rounded parts.
    pub fn to_charges(&self) -> Charges {
        Charges {
            brokerage: fmt2(self.brokerage),
            stt: fmt2(self.stt),
            transaction_charges: fmt2(self.transaction_charges),
            gst: fmt2(self.gst),
            total: fmt2(self.total),
        }
    }
}
