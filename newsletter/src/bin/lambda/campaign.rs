use aws_lambda_events::apigw::ApiGatewayProxyRequest;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use newsletter::campaign_handler::handle_request;
use newsletter::startup::Application;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let application = Application::build("newsletter-campaign").await?;
    let application = &application;

    run(service_fn(
        |event: LambdaEvent<ApiGatewayProxyRequest>| async move {
            let response = handle_request(
                event.payload,
                &application.secret_resolver,
                &application.brevo_client,
                &application.sender,
            )
            .await;

            application.flush_telemetry();

            Ok::<_, Error>(response)
        },
    ))
    .await
}
