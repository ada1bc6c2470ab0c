//! Metrics of the outbound client.

use console_env::{counter_metric, global_meter, histogram_metric_f64};

global_meter!(GLOBAL_METER, "CONSOLE_API");

counter_metric!(REQUEST_FAILURE, GLOBAL_METER);

counter_metric!(AUTO_RETRY_CONNECTION_CLOSED, GLOBAL_METER);

histogram_metric_f64!(EXTERNAL_REQUEST_TIME, GLOBAL_METER);
